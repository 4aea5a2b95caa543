use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use analytics_core::{AnalyticsResult, CacheStore};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

/// 内存缓存实现，语义与Redis缓存对齐
pub struct InMemoryCacheStore {
    entries: Arc<RwLock<HashMap<String, CachedEntry>>>,
}

struct CachedEntry {
    value: Value,
    expires_at: Instant,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> AnalyticsResult<Option<Value>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> AnalyticsResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CachedEntry {
                value: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> AnalyticsResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AnalyticsResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
