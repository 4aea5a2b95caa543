use std::time::Duration;

use async_trait::async_trait;

use crate::errors::AnalyticsResult;

/// 队列传输抽象接口
///
/// 命名FIFO队列加上尽力而为的通知广播，负载是序列化后的线格式字符串。
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// 推送负载到指定队列尾部
    async fn push(&self, queue: &str, payload: &str) -> AnalyticsResult<()>;

    /// 阻塞式弹出队首负载
    ///
    /// 最多等待`timeout`；超时返回`None`，这是空队列轮询的常态而非错误。
    async fn pop(&self, queue: &str, timeout: Duration) -> AnalyticsResult<Option<String>>;

    /// 向通知频道广播负载，供可选的在线订阅者使用
    async fn publish(&self, channel: &str, payload: &str) -> AnalyticsResult<()>;
}
