use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::ValidityError;
use crate::memory::MemoryCache;
use crate::ValidityOracle;

/// Read-through memo in front of another validity oracle.
///
/// Only answers are cached. Errors pass through so the next lookup asks again.
pub struct CachedValidity<V> {
    inner: V,
    memory: MemoryCache,
}

impl<V: ValidityOracle> CachedValidity<V> {
    pub fn new(inner: V, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            memory: MemoryCache::new(max_capacity, ttl),
        }
    }
}

#[async_trait]
impl<V: ValidityOracle> ValidityOracle for CachedValidity<V> {
    async fn is_valid(&self, identifier: &str) -> Result<bool, ValidityError> {
        if let Some(valid) = self.memory.get(identifier).await {
            debug!(ticker = %identifier, valid, "Validity cache hit");
            return Ok(valid);
        }

        let valid = self.inner.is_valid(identifier).await?;
        self.memory.insert(identifier.to_string(), valid).await;
        Ok(valid)
    }
}
