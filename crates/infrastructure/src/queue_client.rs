use std::sync::Arc;
use std::time::Duration;

use analytics_core::{
    AnalyticsError, AnalyticsResult, JobKind, JobMessage, JobQueueService, JobRecord, JobStatus,
    QueueTransport, ResultStore,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

/// 默认结果保留时长：24小时，每次写入重置
const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 队列客户端
///
/// 负责任务消息的序列化上下行与任务记录的读写，是传输层之上唯一理解
/// 线格式的组件。API层和调度器都通过它访问队列与结果存储。
pub struct JobQueueClient {
    transport: Arc<dyn QueueTransport>,
    store: Arc<dyn ResultStore>,
    key_prefix: String,
    result_ttl: Duration,
}

impl JobQueueClient {
    pub fn new(transport: Arc<dyn QueueTransport>, store: Arc<dyn ResultStore>) -> Self {
        Self {
            transport,
            store,
            key_prefix: "job_result".to_string(),
            result_ttl: DEFAULT_RESULT_TTL,
        }
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    pub fn with_result_ttl(mut self, result_ttl: Duration) -> Self {
        self.result_ttl = result_ttl;
        self
    }

    /// 任务记录键: `job_result:<job_id>`
    fn record_key(&self, job_id: &str) -> String {
        format!("{}:{}", self.key_prefix, job_id)
    }
}

#[async_trait]
impl JobQueueService for JobQueueClient {
    async fn enqueue_job(&self, kind: JobKind, message: &JobMessage) -> AnalyticsResult<()> {
        let payload = message.to_wire()?;
        let queue = kind.queue_name();

        self.transport.push(&queue, &payload).await?;

        // 消息已持久入队，通知广播失败不能让调用方误以为任务未入队
        if let Err(e) = self
            .transport
            .publish(&kind.notification_channel(), &payload)
            .await
        {
            warn!("队列 {} 的通知广播失败: {}", queue, e);
        }

        info!("任务 {} 已入队: {}", message.id, queue);
        Ok(())
    }

    async fn dequeue_job(
        &self,
        kind: JobKind,
        timeout: Duration,
    ) -> AnalyticsResult<Option<JobMessage>> {
        match self.transport.pop(&kind.queue_name(), timeout).await? {
            Some(payload) => JobMessage::from_wire(&payload).map(Some),
            None => Ok(None),
        }
    }

    async fn update_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<Value>,
        error_message: Option<String>,
    ) -> AnalyticsResult<()> {
        let key = self.record_key(job_id);

        // 读取现有记录；不存在视为隐式pending记录（upsert，不校验前置状态）
        let mut record = match self.store.get(&key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AnalyticsError::Serialization(format!("解析任务记录失败: {e}")))?,
            None => JobRecord::pending(job_id),
        };

        record.apply(status, result, error_message);

        let raw = serde_json::to_string(&record)
            .map_err(|e| AnalyticsError::Serialization(format!("序列化任务记录失败: {e}")))?;

        // 每次写入都重置保留时长
        self.store.set(&key, &raw, self.result_ttl).await?;

        debug!("任务 {} 状态更新为 {}", job_id, status);
        Ok(())
    }

    async fn get_job_record(&self, job_id: &str) -> AnalyticsResult<Option<JobRecord>> {
        match self.store.get(&self.record_key(job_id)).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| AnalyticsError::Serialization(format!("解析任务记录失败: {e}"))),
            None => Ok(None),
        }
    }
}
