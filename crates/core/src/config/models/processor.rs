use serde::{Deserialize, Serialize};

/// 任务处理调度器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub enabled: bool,
    /// 出队的有界等待时长，决定循环观察到停止信号的及时程度
    pub poll_timeout_seconds: u64,
    /// 传输故障后的固定退避间隔
    pub retry_backoff_seconds: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_timeout_seconds: 5,
            retry_backoff_seconds: 5,
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("出队等待时长必须大于0"));
        }

        if self.retry_backoff_seconds == 0 {
            return Err(anyhow::anyhow!("退避间隔必须大于0"));
        }

        Ok(())
    }
}
