use moka::future::Cache;
use std::time::Duration;

/// In-memory answer cache backed by moka, keyed by ticker.
///
/// Entries are evicted after TTL or when capacity is exceeded.
pub struct MemoryCache {
    inner: Cache<String, bool>,
}

impl MemoryCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<bool> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, value: bool) {
        self.inner.insert(key, value).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}
