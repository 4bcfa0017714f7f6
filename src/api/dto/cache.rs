//! DTOs for cache management endpoints.

use serde::Serialize;

/// Response for `DELETE /cache/{key}`.
#[derive(Debug, Serialize)]
pub struct CacheDeleteResponse {
    pub key: String,
    /// Whether any tier held the key.
    pub removed: bool,
}

/// Response for `DELETE /cache`.
#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    /// Entries removed across all tiers.
    pub cleared: usize,
}
