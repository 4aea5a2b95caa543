use std::sync::Arc;
use std::time::Duration;

use analytics_core::config::ProcessorConfig;
use analytics_core::{
    AnalyticsError, AnalyticsResult, JobHandler, JobKind, JobMessage, JobQueueService, JobStatus,
};
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::registry::HandlerRegistry;

/// 任务处理调度器
///
/// 为每个注册的任务类型启动一条独立的消费循环，循环之间互不阻塞：
/// 某个处理器的失败或缓慢只影响它自己的队列。停止是协作式的，
/// 进行中的处理器执行会先完成，`stop`会等待所有循环退出。
pub struct JobProcessor {
    queue: Arc<dyn JobQueueService>,
    registry: Arc<HandlerRegistry>,
    poll_timeout: Duration,
    retry_backoff: Duration,
    shutdown_tx: RwLock<Option<broadcast::Sender<()>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    is_running: RwLock<bool>,
}

impl JobProcessor {
    pub fn new(
        queue: Arc<dyn JobQueueService>,
        registry: Arc<HandlerRegistry>,
        config: &ProcessorConfig,
    ) -> Self {
        Self {
            queue,
            registry,
            poll_timeout: Duration::from_secs(config.poll_timeout_seconds),
            retry_backoff: Duration::from_secs(config.retry_backoff_seconds),
            shutdown_tx: RwLock::new(None),
            handles: Mutex::new(Vec::new()),
            is_running: RwLock::new(false),
        }
    }

    /// 启动所有消费循环
    pub async fn start(&self) -> AnalyticsResult<()> {
        let mut is_running = self.is_running.write().await;
        if *is_running {
            return Err(AnalyticsError::Internal("任务处理器已在运行".to_string()));
        }

        if self.registry.is_empty() {
            return Err(AnalyticsError::Configuration(
                "没有注册任何任务处理器".to_string(),
            ));
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        let mut handles = self.handles.lock().await;
        for kind in self.registry.kinds() {
            let Some(handler) = self.registry.get(kind) else {
                continue;
            };
            let queue = Arc::clone(&self.queue);
            let shutdown_rx = shutdown_tx.subscribe();
            let poll_timeout = self.poll_timeout;
            let retry_backoff = self.retry_backoff;

            handles.push(tokio::spawn(async move {
                consume_queue(queue, kind, handler, poll_timeout, retry_backoff, shutdown_rx)
                    .await;
            }));
        }

        *self.shutdown_tx.write().await = Some(shutdown_tx);
        *is_running = true;

        info!("任务处理器已启动，共 {} 条消费循环", handles.len());
        Ok(())
    }

    /// 停止处理器
    ///
    /// 广播停止信号并等待所有循环退出；每条循环在当前出队等待结束后退出，
    /// 进行中的处理器执行总是先完成。
    pub async fn stop(&self) -> AnalyticsResult<()> {
        let mut is_running = self.is_running.write().await;
        if !*is_running {
            return Ok(());
        }

        info!("停止任务处理器");

        if let Some(shutdown_tx) = self.shutdown_tx.write().await.take() {
            // 忽略错误：循环也可能已经全部退出
            let _ = shutdown_tx.send(());
        }

        let mut handles = self.handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *is_running = false;
        info!("任务处理器已停止");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}

/// 单个任务类型的消费循环
async fn consume_queue(
    queue: Arc<dyn JobQueueService>,
    kind: JobKind,
    handler: Arc<dyn JobHandler>,
    poll_timeout: Duration,
    retry_backoff: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let queue_name = kind.queue_name();
    info!("消费循环已启动: {}", queue_name);

    loop {
        match queue.dequeue_job(kind, poll_timeout).await {
            Ok(Some(message)) => {
                process_message(queue.as_ref(), kind, handler.as_ref(), message).await;
            }
            // 等待超时、队列为空，继续轮询
            Ok(None) => {}
            Err(AnalyticsError::Serialization(e)) => {
                // 无法还原任务id的坏消息，只能丢弃；循环继续消费
                warn!("队列 {} 丢弃无法解析的消息: {}", queue_name, e);
            }
            Err(e) => {
                error!(
                    "从队列 {} 消费失败: {}，{}秒后重试",
                    queue_name,
                    e,
                    retry_backoff.as_secs()
                );
                // 无限退避重试，直到传输恢复或收到停止信号
                tokio::select! {
                    _ = tokio::time::sleep(retry_backoff) => {}
                    _ = shutdown_rx.recv() => break,
                }
            }
        }

        if shutdown_signalled(&mut shutdown_rx) {
            break;
        }
    }

    info!("消费循环已退出: {}", queue_name);
}

/// 非阻塞地检查停止信号
fn shutdown_signalled(shutdown_rx: &mut broadcast::Receiver<()>) -> bool {
    use tokio::sync::broadcast::error::TryRecvError;

    match shutdown_rx.try_recv() {
        Ok(()) => true,
        // 发送端被丢弃同样视为停止
        Err(TryRecvError::Closed) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) => false,
    }
}

/// 驱动单条消息走完状态生命周期
async fn process_message(
    queue: &dyn JobQueueService,
    kind: JobKind,
    handler: &dyn JobHandler,
    message: JobMessage,
) {
    let job_id = message.id.clone();
    if job_id.is_empty() {
        warn!("队列 {} 收到缺少任务id的消息，已丢弃", kind.queue_name());
        return;
    }

    info!("开始处理任务: job_id={}, kind={}", job_id, kind);

    if let Err(e) = queue
        .update_job_status(&job_id, JobStatus::Processing, None, None)
        .await
    {
        error!("更新任务 {} 为processing失败: {}", job_id, e);
    }

    match handler.handle(&message).await {
        Ok(result) => {
            if let Err(e) = queue
                .update_job_status(&job_id, JobStatus::Completed, Some(result), None)
                .await
            {
                error!("写入任务 {} 的完成状态失败: {}", job_id, e);
            } else {
                info!("任务处理成功: job_id={}, kind={}", job_id, kind);
            }
        }
        Err(e) => {
            // 处理器失败只记录到任务记录，循环继续存活
            warn!("任务处理失败: job_id={}, kind={}, error={}", job_id, kind, e);
            let error_message = e.job_error_message();
            if let Err(e) = queue
                .update_job_status(&job_id, JobStatus::Failed, None, Some(error_message))
                .await
            {
                error!("写入任务 {} 的失败状态失败: {}", job_id, e);
            }
        }
    }
}
