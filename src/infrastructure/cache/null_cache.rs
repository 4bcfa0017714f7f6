//! No-op cache tier used when Redis is not configured or unreachable.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::CacheKey;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// A cache tier that stores nothing.
///
/// Lets the rest of the system treat the distributed tier as always present:
/// every lookup misses, every write succeeds and is dropped.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (distributed cache disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn get(&self, _key: &CacheKey) -> CacheResult<Option<Bytes>> {
        Ok(None)
    }

    async fn put(&self, _key: &CacheKey, _payload: Bytes) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &CacheKey) -> CacheResult<bool> {
        Ok(false)
    }

    async fn clear(&self) -> CacheResult<usize> {
        Ok(0)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
