use std::sync::Arc;
use std::time::Duration;

use analytics_core::config::ProcessorConfig;
use analytics_core::{
    AnalyticsError, AnalyticsResult, JobHandler, JobKind, JobMessage, JobQueueService, JobRecord,
    JobStatus, QueueTransport,
};
use analytics_dispatcher::{HandlerRegistry, JobProcessor};
use analytics_infrastructure::{InMemoryQueueTransport, InMemoryResultStore, JobQueueClient};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

/// 固定返回成功结果的处理器
struct FixedResultHandler {
    result: Value,
}

#[async_trait]
impl JobHandler for FixedResultHandler {
    fn name(&self) -> &str {
        "fixed_result"
    }

    async fn handle(&self, _job: &JobMessage) -> AnalyticsResult<Value> {
        Ok(self.result.clone())
    }
}

/// 固定失败的处理器
struct AlwaysFailHandler {
    message: String,
}

#[async_trait]
impl JobHandler for AlwaysFailHandler {
    fn name(&self) -> &str {
        "always_fail"
    }

    async fn handle(&self, _job: &JobMessage) -> AnalyticsResult<Value> {
        Err(AnalyticsError::Handler(self.message.clone()))
    }
}

/// 记录处理顺序的处理器
struct RecordingHandler {
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl JobHandler for RecordingHandler {
    fn name(&self) -> &str {
        "recording"
    }

    async fn handle(&self, job: &JobMessage) -> AnalyticsResult<Value> {
        self.seen.lock().await.push(job.id.clone());
        Ok(json!({"success": true}))
    }
}

/// 先通知启动、再等待放行的慢处理器
struct SlowHandler {
    started_tx: tokio::sync::mpsc::UnboundedSender<()>,
    duration: Duration,
}

#[async_trait]
impl JobHandler for SlowHandler {
    fn name(&self) -> &str {
        "slow"
    }

    async fn handle(&self, _job: &JobMessage) -> AnalyticsResult<Value> {
        let _ = self.started_tx.send(());
        tokio::time::sleep(self.duration).await;
        Ok(json!({"success": true}))
    }
}

/// 出队先失败若干次再恢复的队列服务，模拟传输短暂不可用
struct FlakyQueueService {
    inner: Arc<JobQueueClient>,
    dequeue_failures_remaining: Arc<Mutex<u32>>,
}

#[async_trait]
impl JobQueueService for FlakyQueueService {
    async fn enqueue_job(&self, kind: JobKind, message: &JobMessage) -> AnalyticsResult<()> {
        self.inner.enqueue_job(kind, message).await
    }

    async fn dequeue_job(
        &self,
        kind: JobKind,
        timeout: Duration,
    ) -> AnalyticsResult<Option<JobMessage>> {
        {
            let mut remaining = self.dequeue_failures_remaining.lock().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(AnalyticsError::Transport("connection refused".to_string()));
            }
        }
        self.inner.dequeue_job(kind, timeout).await
    }

    async fn update_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<Value>,
        error_message: Option<String>,
    ) -> AnalyticsResult<()> {
        self.inner
            .update_job_status(job_id, status, result, error_message)
            .await
    }

    async fn get_job_record(
        &self,
        job_id: &str,
    ) -> AnalyticsResult<Option<analytics_core::JobRecord>> {
        self.inner.get_job_record(job_id).await
    }
}

fn fast_config() -> ProcessorConfig {
    ProcessorConfig {
        enabled: true,
        poll_timeout_seconds: 1,
        retry_backoff_seconds: 1,
    }
}

fn memory_client() -> (Arc<JobQueueClient>, Arc<InMemoryQueueTransport>) {
    let transport = Arc::new(InMemoryQueueTransport::new());
    let store = Arc::new(InMemoryResultStore::new());
    let client = Arc::new(JobQueueClient::new(
        Arc::clone(&transport) as Arc<dyn QueueTransport>,
        store,
    ));
    (client, transport)
}

/// 轮询等待任务进入终态
async fn wait_for_terminal(
    queue: &dyn JobQueueService,
    job_id: &str,
    timeout: Duration,
) -> Option<JobRecord> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if let Some(record) = queue.get_job_record(job_id).await.unwrap() {
            if record.is_finished() {
                return Some(record);
            }
        }
        if tokio::time::Instant::now() >= deadline {
            return None;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn test_job_completes_with_handler_result() {
    let (client, _) = memory_client();
    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::DataProcessing,
        Arc::new(FixedResultHandler {
            result: json!({"success": true, "processedRows": 950}),
        }),
    );

    let processor = JobProcessor::new(
        Arc::clone(&client) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    let message = JobMessage::new("job-1").with_parameters(json!({"op": "clean"}));
    client
        .enqueue_job(JobKind::DataProcessing, &message)
        .await
        .unwrap();

    let record = wait_for_terminal(client.as_ref(), "job-1", Duration::from_secs(5))
        .await
        .expect("任务应在限期内完成");
    assert_eq!(record.job_id, "job-1");
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(
        record.result,
        Some(json!({"success": true, "processedRows": 950}))
    );
    assert!(record.completed_at.is_some());
    assert!(record.error_message.is_none());

    processor.stop().await.unwrap();
}

#[tokio::test]
async fn test_failing_handler_marks_job_failed() {
    let (client, _) = memory_client();
    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::Prediction,
        Arc::new(AlwaysFailHandler {
            message: "model not found".to_string(),
        }),
    );

    let processor = JobProcessor::new(
        Arc::clone(&client) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    client
        .enqueue_job(JobKind::Prediction, &JobMessage::new("job-2"))
        .await
        .unwrap();

    let record = wait_for_terminal(client.as_ref(), "job-2", Duration::from_secs(5))
        .await
        .expect("任务应在限期内进入终态");
    assert_eq!(record.status, JobStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("model not found"));
    assert!(record.result.is_none());
    assert!(record.completed_at.is_some());

    processor.stop().await.unwrap();
}

#[tokio::test]
async fn test_failing_kind_does_not_block_other_kinds() {
    let (client, _) = memory_client();
    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::ModelTraining,
        Arc::new(AlwaysFailHandler {
            message: "training backend down".to_string(),
        }),
    );
    registry.register(
        JobKind::Visualization,
        Arc::new(FixedResultHandler {
            result: json!({"success": true, "chartType": "bar"}),
        }),
    );

    let processor = JobProcessor::new(
        Arc::clone(&client) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    for i in 0..3 {
        client
            .enqueue_job(
                JobKind::ModelTraining,
                &JobMessage::new(format!("train-{i}")),
            )
            .await
            .unwrap();
    }
    client
        .enqueue_job(JobKind::Visualization, &JobMessage::new("viz-1"))
        .await
        .unwrap();

    // model_training全部失败不影响visualization循环的存活
    let viz = wait_for_terminal(client.as_ref(), "viz-1", Duration::from_secs(5))
        .await
        .expect("visualization任务应正常完成");
    assert_eq!(viz.status, JobStatus::Completed);

    for i in 0..3 {
        let record = wait_for_terminal(client.as_ref(), &format!("train-{i}"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(record.status, JobStatus::Failed);
    }

    processor.stop().await.unwrap();
}

#[tokio::test]
async fn test_same_queue_is_consumed_in_fifo_order() {
    let (client, _) = memory_client();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::StatisticalAnalysis,
        Arc::new(RecordingHandler {
            seen: Arc::clone(&seen),
        }),
    );

    // 先入队再启动，保证两条消息都在队列里排好
    for id in ["job-a", "job-b", "job-c"] {
        client
            .enqueue_job(JobKind::StatisticalAnalysis, &JobMessage::new(id))
            .await
            .unwrap();
    }

    let processor = JobProcessor::new(
        Arc::clone(&client) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    wait_for_terminal(client.as_ref(), "job-c", Duration::from_secs(5))
        .await
        .expect("最后一条消息应被处理");

    assert_eq!(*seen.lock().await, vec!["job-a", "job-b", "job-c"]);

    processor.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_waits_for_in_flight_handler() {
    let (client, _) = memory_client();
    let (started_tx, mut started_rx) = tokio::sync::mpsc::unbounded_channel();

    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::DataProcessing,
        Arc::new(SlowHandler {
            started_tx,
            duration: Duration::from_millis(200),
        }),
    );

    let processor = JobProcessor::new(
        Arc::clone(&client) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    client
        .enqueue_job(JobKind::DataProcessing, &JobMessage::new("job-slow"))
        .await
        .unwrap();

    // 等处理器真正开始执行后再触发停止
    started_rx.recv().await.unwrap();
    processor.stop().await.unwrap();
    assert!(!processor.is_running().await);

    // 进行中的执行在停止前完成，终态已经落盘
    let record = client.get_job_record("job-slow").await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Completed);
}

#[tokio::test]
async fn test_malformed_message_does_not_kill_loop() {
    let transport = Arc::new(InMemoryQueueTransport::new());
    let store = Arc::new(InMemoryResultStore::new());
    let client = Arc::new(JobQueueClient::new(
        Arc::clone(&transport) as Arc<dyn QueueTransport>,
        store,
    ));

    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::DataProcessing,
        Arc::new(FixedResultHandler {
            result: json!({"success": true}),
        }),
    );

    // 队列头部塞一条坏消息
    transport
        .push(&JobKind::DataProcessing.queue_name(), "{\"no\":\"id\"}")
        .await
        .unwrap();

    let processor = JobProcessor::new(
        Arc::clone(&client) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    // 坏消息被丢弃后，后续正常消息仍被处理
    client
        .enqueue_job(JobKind::DataProcessing, &JobMessage::new("job-ok"))
        .await
        .unwrap();

    let record = wait_for_terminal(client.as_ref(), "job-ok", Duration::from_secs(5))
        .await
        .expect("坏消息之后循环应继续消费");
    assert_eq!(record.status, JobStatus::Completed);

    processor.stop().await.unwrap();
}

#[tokio::test]
async fn test_loop_backs_off_and_recovers_from_transport_failure() {
    let (inner, _) = memory_client();
    let flaky = Arc::new(FlakyQueueService {
        inner: Arc::clone(&inner),
        dequeue_failures_remaining: Arc::new(Mutex::new(2)),
    });

    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::DataProcessing,
        Arc::new(FixedResultHandler {
            result: json!({"success": true}),
        }),
    );

    let processor = JobProcessor::new(
        Arc::clone(&flaky) as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();

    flaky
        .enqueue_job(JobKind::DataProcessing, &JobMessage::new("job-after-outage"))
        .await
        .unwrap();

    // 循环吃掉两次传输错误（每次退避1秒）后恢复消费
    let record = wait_for_terminal(flaky.as_ref(), "job-after-outage", Duration::from_secs(10))
        .await
        .expect("传输恢复后任务应被处理");
    assert_eq!(record.status, JobStatus::Completed);

    processor.stop().await.unwrap();
}

#[tokio::test]
async fn test_start_requires_registered_handlers() {
    let (client, _) = memory_client();
    let processor = JobProcessor::new(
        client as Arc<dyn JobQueueService>,
        Arc::new(HandlerRegistry::new()),
        &fast_config(),
    );
    assert!(processor.start().await.is_err());
}

#[tokio::test]
async fn test_double_start_is_rejected() {
    let (client, _) = memory_client();
    let mut registry = HandlerRegistry::new();
    registry.register(
        JobKind::DataProcessing,
        Arc::new(FixedResultHandler {
            result: json!({}),
        }),
    );

    let processor = JobProcessor::new(
        client as Arc<dyn JobQueueService>,
        Arc::new(registry),
        &fast_config(),
    );
    processor.start().await.unwrap();
    assert!(processor.start().await.is_err());
    processor.stop().await.unwrap();

    // 停止后可以再次启动
    processor.start().await.unwrap();
    processor.stop().await.unwrap();
}
