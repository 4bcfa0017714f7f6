//! Cache tier trait and error types.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

use crate::domain::entities::CacheKey;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
    Io(std::io::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
            Self::Io(e) => write!(f, "Cache I/O error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// One storage tier for rendered screenshots.
///
/// Every tier shares the same key space ([`CacheKey`]) and is constructed with
/// its own TTL; entries older than that TTL must never be returned.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::DiskCache`] - local files, lazy TTL
/// - [`crate::infrastructure::cache::RedisCache`] - shared Redis, server-side TTL
/// - [`crate::infrastructure::cache::NullCache`] - no-op stand-in for a missing tier
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Short tier name used in logs, metrics and health output.
    fn name(&self) -> &'static str;

    /// Retrieves a fresh entry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` on hit
    /// - `Ok(None)` on miss or expired entry
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>>;

    /// Stores an entry, replacing any previous value for the key.
    async fn put(&self, key: &CacheKey, payload: Bytes) -> CacheResult<()>;

    /// Removes an entry. Returns whether something was removed; a missing
    /// key is not an error.
    async fn delete(&self, key: &CacheKey) -> CacheResult<bool>;

    /// Removes every entry of this tier and returns how many were removed.
    async fn clear(&self) -> CacheResult<usize>;

    /// Checks if the tier is usable.
    async fn health_check(&self) -> bool;
}
