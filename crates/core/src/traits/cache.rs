use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::AnalyticsResult;

/// 读穿缓存抽象接口（cache-aside）
///
/// 处理器用它记忆化昂贵计算，核心本身不强依赖缓存。
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> AnalyticsResult<Option<Value>>;

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> AnalyticsResult<()>;

    async fn delete(&self, key: &str) -> AnalyticsResult<()>;

    async fn exists(&self, key: &str) -> AnalyticsResult<bool>;
}

/// 缓存键约定
pub mod cache_keys {
    /// 数据集画像
    pub fn dataset_profile(dataset_id: &str) -> String {
        format!("profile:{dataset_id}")
    }

    /// 已训练模型元数据
    pub fn model(model_id: &str) -> String {
        format!("model:{model_id}")
    }

    /// 统计分析结果
    pub fn statistics(dataset_id: &str, analysis_type: &str) -> String {
        format!("stats:{dataset_id}:{analysis_type}")
    }

    /// 可视化结果
    pub fn visualization(dataset_id: &str, chart_type: &str) -> String {
        format!("viz:{dataset_id}:{chart_type}")
    }

}
