use serde::{Deserialize, Serialize};

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub key_prefix: String,
    pub default_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            key_prefix: "analytics".to_string(),
            default_ttl_seconds: 3600,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.enabled && self.default_ttl_seconds == 0 {
            return Err(anyhow::anyhow!("缓存默认过期时间必须大于0"));
        }

        Ok(())
    }
}
