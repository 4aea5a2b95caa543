use std::sync::Arc;
use std::time::Duration;

use analytics_core::{AnalyticsError, AnalyticsResult, CacheStore};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::connection::RedisConnectionManager;

/// 基于Redis的缓存实现
///
/// 值以JSON存储，键带实例级前缀与其他数据隔离。
pub struct RedisCacheStore {
    connection: Arc<RedisConnectionManager>,
    key_prefix: String,
}

impl RedisCacheStore {
    pub fn new(connection: Arc<RedisConnectionManager>, key_prefix: impl Into<String>) -> Self {
        Self {
            connection,
            key_prefix: key_prefix.into(),
        }
    }

    fn build_key(&self, key: &str) -> String {
        if self.key_prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}:{}", self.key_prefix, key)
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> AnalyticsResult<Option<Value>> {
        let full_key = self.build_key(key);
        let mut cmd = redis::cmd("GET");
        cmd.arg(&full_key);
        let raw: Option<String> = self.connection.execute_command(&cmd).await?;

        match raw {
            Some(raw) => {
                debug!("缓存命中: {}", full_key);
                let value = serde_json::from_str(&raw)
                    .map_err(|e| AnalyticsError::Cache(format!("解析缓存值失败: {e}")))?;
                Ok(Some(value))
            }
            None => {
                debug!("缓存未命中: {}", full_key);
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> AnalyticsResult<()> {
        let full_key = self.build_key(key);
        let raw = serde_json::to_string(value)
            .map_err(|e| AnalyticsError::Cache(format!("序列化缓存值失败: {e}")))?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(&full_key).arg(raw).arg("EX").arg(ttl.as_secs().max(1));
        let _: () = self.connection.execute_command(&cmd).await?;

        debug!("缓存已写入: {} (ttl={}秒)", full_key, ttl.as_secs());
        Ok(())
    }

    async fn delete(&self, key: &str) -> AnalyticsResult<()> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(self.build_key(key));
        let _: i64 = self.connection.execute_command(&cmd).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AnalyticsResult<bool> {
        let mut cmd = redis::cmd("EXISTS");
        cmd.arg(self.build_key(key));
        let count: i64 = self.connection.execute_command(&cmd).await?;
        Ok(count > 0)
    }
}
