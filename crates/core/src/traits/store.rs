use std::time::Duration;

use async_trait::async_trait;

use crate::errors::AnalyticsResult;

/// 结果存储抽象接口
///
/// 带条目级过期时间的键值存储；条目到期后读取视同不存在。
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// 读取键值，不存在或已过期返回`None`
    async fn get(&self, key: &str) -> AnalyticsResult<Option<String>>;

    /// 写入键值并重置过期时间
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AnalyticsResult<()>;
}
