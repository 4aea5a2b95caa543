use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AnalyticsResult;
use crate::models::{JobKind, JobMessage, JobRecord, JobStatus};

/// 任务队列服务契约（队列客户端）
///
/// API层和调度器共同消费的接口：API侧使用入队、查询和管理用状态更新，
/// 调度器侧使用出队和状态更新。
#[async_trait]
pub trait JobQueueService: Send + Sync {
    /// 序列化消息并追加到kind对应队列尾部，同时在通知频道广播
    ///
    /// 返回错误意味着任务未入队（不存在部分入队），调用方需自行重试或上报。
    async fn enqueue_job(&self, kind: JobKind, message: &JobMessage) -> AnalyticsResult<()>;

    /// 阻塞等待kind队列的下一条消息，超时返回`None`
    async fn dequeue_job(
        &self,
        kind: JobKind,
        timeout: Duration,
    ) -> AnalyticsResult<Option<JobMessage>>;

    /// 更新任务状态
    ///
    /// upsert语义：记录不存在时按隐式pending记录合并。每次写入重置过期时间。
    /// 相同参数重复调用是幂等的。
    async fn update_job_status(
        &self,
        job_id: &str,
        status: JobStatus,
        result: Option<Value>,
        error_message: Option<String>,
    ) -> AnalyticsResult<()>;

    /// 查询任务记录，不存在或已过期返回`None`
    async fn get_job_record(&self, job_id: &str) -> AnalyticsResult<Option<JobRecord>>;
}
