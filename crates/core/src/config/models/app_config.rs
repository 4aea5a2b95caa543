use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ApiConfig, CacheConfig, MessageQueueConfig, ProcessorConfig, ResultStoreConfig};

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub message_queue: MessageQueueConfig,
    pub result_store: ResultStoreConfig,
    pub cache: CacheConfig,
    pub processor: ProcessorConfig,
    pub api: ApiConfig,
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: ANALYTICS_)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            // Try to load default config files
            let default_paths = [
                "config/analytics.toml",
                "analytics.toml",
                "/etc/analytics-engine/config.toml",
            ];

            for path in &default_paths {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        // Environment variable overrides (prefix: ANALYTICS_) - highest priority
        builder = builder.add_source(
            Environment::with_prefix("ANALYTICS")
                .separator("_")
                .try_parsing(true),
        );

        let raw = builder.build().context("构建配置失败")?;

        // 缺失的段落回落到默认值
        let config: AppConfig = raw
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// Validate configuration effectiveness
    pub fn validate(&self) -> Result<()> {
        self.message_queue
            .validate()
            .context("消息队列配置验证失败")?;

        self.result_store
            .validate()
            .context("结果存储配置验证失败")?;

        self.cache.validate().context("缓存配置验证失败")?;

        self.processor.validate().context("处理器配置验证失败")?;

        self.api.validate().context("API配置验证失败")?;

        Ok(())
    }
}
