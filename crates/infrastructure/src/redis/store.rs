use std::sync::Arc;
use std::time::Duration;

use analytics_core::{AnalyticsResult, ResultStore};
use async_trait::async_trait;
use tracing::debug;

use super::connection::RedisConnectionManager;

/// 基于Redis字符串的结果存储实现
///
/// `SETEX`写入并重置过期时间，到期条目由Redis自行淘汰。
pub struct RedisResultStore {
    connection: Arc<RedisConnectionManager>,
}

impl RedisResultStore {
    pub fn new(connection: Arc<RedisConnectionManager>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn get(&self, key: &str) -> AnalyticsResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key);
        self.connection.execute_command(&cmd).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AnalyticsResult<()> {
        let mut cmd = redis::cmd("SETEX");
        cmd.arg(key).arg(ttl.as_secs().max(1)).arg(value);
        let _: () = self.connection.execute_command(&cmd).await?;

        debug!("结果已写入: {} (ttl={}秒)", key, ttl.as_secs());
        Ok(())
    }
}
