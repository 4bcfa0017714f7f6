//! Screenshot cache tiers.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`DiskCache`] - Local directory, always present
//! - [`RedisCache`] - Shared Redis tier, optional
//! - [`NullCache`] - No-op stand-in when Redis is not configured

mod disk_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use disk_cache::{DiskCache, DiskStats};
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;
