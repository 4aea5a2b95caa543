use serde::{Deserialize, Serialize};

/// 队列后端类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueueBackend {
    /// Redis列表 + 发布订阅（默认）
    #[default]
    Redis,
    /// 进程内内存队列，用于嵌入式部署和测试
    Memory,
}

/// Redis connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub database: i64,
    pub password: Option<String>,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            database: 0,
            password: None,
        }
    }
}

impl RedisConfig {
    /// Validate Redis configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.is_empty() {
            return Err(anyhow::anyhow!("Redis主机地址不能为空"));
        }

        if self.port == 0 {
            return Err(anyhow::anyhow!("Redis端口必须大于0"));
        }

        if self.database < 0 {
            return Err(anyhow::anyhow!("Redis数据库索引不能为负数"));
        }

        Ok(())
    }

    /// Build Redis connection URL
    pub fn build_url(&self) -> String {
        let auth = if let Some(password) = &self.password {
            format!(":{password}@")
        } else {
            String::new()
        };
        format!(
            "redis://{}{}:{}/{}",
            auth, self.host, self.port, self.database
        )
    }
}

/// Message queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageQueueConfig {
    pub backend: QueueBackend,
    /// Redis连接URL；为空时退回`redis`字段拼装
    pub url: String,
    pub connection_timeout_seconds: u64,
    pub redis: Option<RedisConfig>,
}

impl MessageQueueConfig {
    /// Validate message queue configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.connection_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("连接超时时间必须大于0"));
        }

        match self.backend {
            QueueBackend::Redis => {
                if !self.url.is_empty()
                    && !self.url.starts_with("redis://")
                    && !self.url.starts_with("rediss://")
                {
                    return Err(anyhow::anyhow!("Redis URL必须是redis://或rediss://格式"));
                }

                if let Some(redis) = &self.redis {
                    redis.validate()?;
                } else if self.url.is_empty() {
                    return Err(anyhow::anyhow!("使用Redis后端时，必须提供URL或redis配置"));
                }
            }
            QueueBackend::Memory => {}
        }

        Ok(())
    }

    /// Get Redis connection URL (if configured)
    pub fn redis_url(&self) -> Option<String> {
        if self.backend != QueueBackend::Redis {
            return None;
        }
        if !self.url.is_empty() {
            Some(self.url.clone())
        } else {
            self.redis.as_ref().map(|redis| redis.build_url())
        }
    }
}

impl Default for MessageQueueConfig {
    fn default() -> Self {
        Self {
            backend: QueueBackend::default(),
            url: "redis://localhost:6379".to_string(),
            connection_timeout_seconds: 30,
            redis: None,
        }
    }
}
