use std::time::Duration;

use analytics_core::{AnalyticsError, AnalyticsResult};
use redis::aio::ConnectionManager;
use tracing::info;

/// Redis连接管理器
///
/// 包装 `redis::aio::ConnectionManager`（内部多路复用，支持多调用方并发使用），
/// 连接时PING验证，命令失败统一映射为传输错误。
pub struct RedisConnectionManager {
    connection: ConnectionManager,
}

impl RedisConnectionManager {
    /// 建立连接并验证可达性
    pub async fn connect(url: &str, timeout: Duration) -> AnalyticsResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AnalyticsError::Transport(format!("无效的Redis URL: {e}")))?;

        let connection = tokio::time::timeout(timeout, client.get_connection_manager())
            .await
            .map_err(|_| {
                AnalyticsError::Transport(format!("连接Redis超时 ({}秒)", timeout.as_secs()))
            })?
            .map_err(|e| AnalyticsError::Transport(format!("连接Redis失败: {e}")))?;

        let manager = Self { connection };
        manager.ping().await?;

        info!("成功连接到Redis: {}", mask_url(url));
        Ok(manager)
    }

    /// 执行单条Redis命令
    pub async fn execute_command<T: redis::FromRedisValue>(
        &self,
        cmd: &redis::Cmd,
    ) -> AnalyticsResult<T> {
        let mut connection = self.connection.clone();
        cmd.query_async(&mut connection)
            .await
            .map_err(|e| AnalyticsError::Transport(format!("Redis命令执行失败: {e}")))
    }

    /// 连接健康检查
    pub async fn ping(&self) -> AnalyticsResult<()> {
        let _: String = self.execute_command(&redis::cmd("PING")).await?;
        Ok(())
    }
}

/// 屏蔽URL中的密码部分
fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let mut masked = url.to_string();
            masked.replace_range(colon_pos + 1..at_pos, "***");
            return masked;
        }
    }
    url.to_string()
}
