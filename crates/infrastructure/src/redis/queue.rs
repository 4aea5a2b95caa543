use std::sync::Arc;
use std::time::Duration;

use analytics_core::{AnalyticsResult, QueueTransport};
use async_trait::async_trait;
use tracing::debug;

use super::connection::RedisConnectionManager;

/// 基于Redis列表的队列传输实现
///
/// `LPUSH`入队、`BRPOP`阻塞出队构成FIFO；每次入队后在通知频道`PUBLISH`
/// 同一负载，供可选的在线订阅者使用。
pub struct RedisQueueTransport {
    connection: Arc<RedisConnectionManager>,
}

impl RedisQueueTransport {
    pub fn new(connection: Arc<RedisConnectionManager>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl QueueTransport for RedisQueueTransport {
    async fn push(&self, queue: &str, payload: &str) -> AnalyticsResult<()> {
        let mut cmd = redis::cmd("LPUSH");
        cmd.arg(queue).arg(payload);
        let _: i64 = self.connection.execute_command(&cmd).await?;

        debug!("消息已推送到队列: {}", queue);
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout: Duration) -> AnalyticsResult<Option<String>> {
        let mut cmd = redis::cmd("BRPOP");
        cmd.arg(queue).arg(timeout.as_secs_f64());
        let result: Option<(String, String)> = self.connection.execute_command(&cmd).await?;

        match result {
            Some((_, payload)) => {
                debug!("从队列 {} 取出消息", queue);
                Ok(Some(payload))
            }
            // 等待超时，队列为空属于轮询常态
            None => Ok(None),
        }
    }

    async fn publish(&self, channel: &str, payload: &str) -> AnalyticsResult<()> {
        let mut cmd = redis::cmd("PUBLISH");
        cmd.arg(channel).arg(payload);
        let receivers: i64 = self.connection.execute_command(&cmd).await?;

        debug!("通知已广播到频道 {} ({} 个订阅者)", channel, receivers);
        Ok(())
    }
}
