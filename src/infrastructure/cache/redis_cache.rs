//! Redis-backed distributed cache tier.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::CacheKey;
use async_trait::async_trait;
use bytes::Bytes;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

/// Connection attempts made before giving up on Redis at startup.
const CONNECT_ATTEMPTS: usize = 3;

/// Keys fetched per SCAN round trip during [`CacheService::clear`].
const SCAN_BATCH: usize = 200;

/// Redis cache tier for rendered screenshots.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// All operations are fail-open: errors are logged and reported as misses
/// (reads) or swallowed (writes), never propagated to callers.
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and configures the TTL.
    ///
    /// Retries the initial connection a few times with jittered exponential backoff
    /// so a Redis container that starts slightly later than the service is picked up.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, ttl: Duration) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        // 500ms, 1s, ... between attempts
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(CONNECT_ATTEMPTS - 1);

        let manager = Retry::start(strategy, || {
            let client = client.clone();
            async move {
                let mut manager = ConnectionManager::new(client).await?;
                manager.ping::<()>().await?;
                Ok::<_, redis::RedisError>(manager)
            }
        })
        .await
        .map_err(|e| CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            ttl_seconds: ttl.as_secs().max(1),
            key_prefix: "shot:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &CacheKey) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &CacheKey) -> CacheResult<Option<Bytes>> {
        let redis_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<Vec<u8>>>(&redis_key).await {
            Ok(Some(payload)) => {
                debug!("Redis HIT: {} ({} bytes)", key, payload.len());
                Ok(Some(Bytes::from(payload)))
            }
            Ok(None) => {
                debug!("Redis MISS: {}", key);
                Ok(None)
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn put(&self, key: &CacheKey, payload: Bytes) -> CacheResult<()> {
        let redis_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn
            .set_ex::<_, _, ()>(&redis_key, payload.to_vec(), self.ttl_seconds)
            .await
        {
            Ok(_) => {
                debug!(
                    "Redis SET: {} ({} bytes, TTL: {}s)",
                    key,
                    payload.len(),
                    self.ttl_seconds
                );
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", key, e);
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &CacheKey) -> CacheResult<bool> {
        let redis_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&redis_key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Redis DEL: {}", key);
                }
                Ok(deleted > 0)
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", key, e);
                Ok(false)
            }
        }
    }

    async fn clear(&self) -> CacheResult<usize> {
        let pattern = format!("{}*", self.key_prefix);
        let mut conn = self.client.clone();
        let mut cursor: u64 = 0;
        let mut removed = 0usize;

        loop {
            let scanned: redis::RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await;

            let (next, keys) = match scanned {
                Ok(page) => page,
                Err(e) => {
                    warn!("Redis SCAN error during clear: {}", e);
                    break;
                }
            };

            if !keys.is_empty() {
                match conn.del::<_, usize>(&keys).await {
                    Ok(deleted) => removed += deleted,
                    Err(e) => warn!("Redis DEL error during clear: {}", e),
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        info!("Redis cache cleared ({} entries)", removed);
        Ok(removed)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
