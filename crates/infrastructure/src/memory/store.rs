use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use analytics_core::{AnalyticsResult, ResultStore};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// 内存结果存储实现
///
/// 条目带过期时刻，读取时惰性清理，不单独起清理任务。
pub struct InMemoryResultStore {
    entries: Arc<RwLock<HashMap<String, StoredEntry>>>,
}

struct StoredEntry {
    value: String,
    expires_at: Instant,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// 当前存活条目数（测试用）
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.read().await;
        entries.values().filter(|e| e.expires_at > now).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryResultStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn get(&self, key: &str) -> AnalyticsResult<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // 条目已过期，清理后按不存在处理
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AnalyticsResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }
}
