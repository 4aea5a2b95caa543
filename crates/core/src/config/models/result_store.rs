use serde::{Deserialize, Serialize};

/// 任务结果存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultStoreConfig {
    /// 记录键前缀，完整键为 `<key_prefix>:<job_id>`
    pub key_prefix: String,
    /// 记录保留时长，每次写入都会重置
    pub ttl_hours: u64,
}

impl Default for ResultStoreConfig {
    fn default() -> Self {
        Self {
            key_prefix: "job_result".to_string(),
            ttl_hours: 24,
        }
    }
}

impl ResultStoreConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.key_prefix.is_empty() {
            return Err(anyhow::anyhow!("结果存储键前缀不能为空"));
        }

        if self.ttl_hours == 0 {
            return Err(anyhow::anyhow!("结果保留时长必须大于0"));
        }

        Ok(())
    }
}
