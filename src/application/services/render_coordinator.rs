//! Two-tier cache lookup with at most one render per key.
//!
//! A request first checks the local disk tier, then the distributed tier.
//! On a miss it either joins the render already in flight for that key or
//! registers a new one. The render itself runs in a spawned task, so a
//! caller that goes away neither cancels it nor leaves a stale registry
//! entry behind.

use bytes::Bytes;
use metrics::counter;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::domain::capture::{RenderError, RenderRequest};
use crate::domain::entities::{CacheKey, Fingerprint};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::imaging::ImageProcessor;
use crate::telemetry::{
    METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_RENDER_FAILED, METRIC_RENDER_JOINED,
    METRIC_RENDER_STARTED,
};

type RenderOutcome = Result<Bytes, RenderError>;
type OutcomeReceiver = watch::Receiver<Option<RenderOutcome>>;
type Registry = Arc<Mutex<HashMap<CacheKey, OutcomeReceiver>>>;

/// The disk and distributed cache tiers, used together.
#[derive(Clone)]
pub struct CacheTiers {
    pub disk: Arc<dyn CacheService>,
    pub distributed: Arc<dyn CacheService>,
}

impl CacheTiers {
    pub fn new(disk: Arc<dyn CacheService>, distributed: Arc<dyn CacheService>) -> Self {
        Self { disk, distributed }
    }

    async fn read(tier: &dyn CacheService, key: &CacheKey) -> Option<Bytes> {
        match tier.get(key).await {
            Ok(Some(payload)) => {
                counter!(METRIC_CACHE_HIT, "tier" => tier.name()).increment(1);
                Some(payload)
            }
            Ok(None) => None,
            Err(e) => {
                debug!("{} cache read failed for {}: {}", tier.name(), key, e);
                None
            }
        }
    }

    async fn write(tier: &dyn CacheService, key: &CacheKey, payload: Bytes) {
        if let Err(e) = tier.put(key, payload).await {
            warn!("{} cache write failed for {}: {}", tier.name(), key, e);
        }
    }

    /// Reads a key from disk, then from the distributed tier.
    ///
    /// A distributed hit is copied to disk before returning.
    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        if let Some(payload) = Self::read(self.disk.as_ref(), key).await {
            return Some(payload);
        }

        let payload = Self::read(self.distributed.as_ref(), key).await?;
        Self::write(self.disk.as_ref(), key, payload.clone()).await;
        Some(payload)
    }

    /// Writes a key to both tiers. Failures are logged and ignored.
    pub async fn put(&self, key: &CacheKey, payload: Bytes) {
        Self::write(self.disk.as_ref(), key, payload.clone()).await;
        Self::write(self.distributed.as_ref(), key, payload).await;
    }

    /// Removes a key from both tiers. Returns whether any tier held it.
    pub async fn delete(&self, key: &CacheKey) -> bool {
        let mut removed = false;
        for tier in [&self.disk, &self.distributed] {
            match tier.delete(key).await {
                Ok(hit) => removed |= hit,
                Err(e) => warn!("{} cache delete failed for {}: {}", tier.name(), key, e),
            }
        }
        removed
    }

    /// Clears both tiers and returns the number of entries removed.
    pub async fn clear(&self) -> usize {
        let mut removed = 0;
        for tier in [&self.disk, &self.distributed] {
            match tier.clear().await {
                Ok(count) => removed += count,
                Err(e) => warn!("{} cache clear failed: {}", tier.name(), e),
            }
        }
        removed
    }
}

/// Resolves fingerprints to screenshot bytes, rendering on a miss.
pub struct RenderCoordinator {
    tiers: CacheTiers,
    processor: ImageProcessor,
    render_timeout: Duration,
    in_flight: Registry,
}

impl RenderCoordinator {
    pub fn new(tiers: CacheTiers, processor: ImageProcessor, render_timeout: Duration) -> Self {
        Self {
            tiers,
            processor,
            render_timeout,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn tiers(&self) -> &CacheTiers {
        &self.tiers
    }

    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }

    /// Number of renders currently running.
    pub fn in_flight(&self) -> usize {
        lock(&self.in_flight).len()
    }

    /// Returns the screenshot for `fingerprint`, rendering it with `render`
    /// if no tier has it.
    ///
    /// Concurrent calls for the same key share one render and all receive
    /// the same outcome. A failed render caches nothing.
    ///
    /// # Errors
    ///
    /// Returns the [`RenderError`] of the shared render.
    pub async fn resolve<F, Fut>(&self, fingerprint: &Fingerprint, render: F) -> RenderOutcome
    where
        F: FnOnce(RenderRequest) -> Fut + Send + 'static,
        Fut: Future<Output = RenderOutcome> + Send + 'static,
    {
        if let Some(payload) = self.tiers.get(&fingerprint.key).await {
            return Ok(payload);
        }
        counter!(METRIC_CACHE_MISS).increment(1);

        let receiver = self.join_or_start(fingerprint, render);
        wait_for(receiver).await
    }

    /// Reads a key from the tiers without ever rendering.
    pub async fn cached(&self, key: &CacheKey) -> Option<Bytes> {
        self.tiers.get(key).await
    }

    /// Removes one key from both tiers.
    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.tiers.delete(key).await
    }

    /// Empties both tiers.
    pub async fn clear(&self) -> usize {
        self.tiers.clear().await
    }

    fn join_or_start<F, Fut>(&self, fingerprint: &Fingerprint, render: F) -> OutcomeReceiver
    where
        F: FnOnce(RenderRequest) -> Fut + Send + 'static,
        Fut: Future<Output = RenderOutcome> + Send + 'static,
    {
        let mut registry = lock(&self.in_flight);

        if let Some(existing) = registry.get(&fingerprint.key) {
            counter!(METRIC_RENDER_JOINED).increment(1);
            debug!("Joining in-flight render for {}", fingerprint.key);
            return existing.clone();
        }

        let (sender, receiver) = watch::channel(None);
        registry.insert(fingerprint.key.clone(), receiver.clone());
        drop(registry);

        let job = RenderJob {
            tiers: self.tiers.clone(),
            processor: self.processor,
            render_timeout: self.render_timeout,
            fingerprint: fingerprint.clone(),
        };
        let registration = Registration {
            registry: Arc::clone(&self.in_flight),
            key: fingerprint.key.clone(),
        };
        tokio::spawn(job.run(render, registration, sender));

        receiver
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn wait_for(mut receiver: OutcomeReceiver) -> RenderOutcome {
    loop {
        let current = receiver.borrow_and_update().clone();
        if let Some(outcome) = current {
            return outcome;
        }
        if receiver.changed().await.is_err() {
            let last = receiver.borrow().clone();
            return last.unwrap_or_else(|| {
                Err(RenderError::Failed("render task aborted".to_string()))
            });
        }
    }
}

/// Registry entry of a running render; removed when dropped.
struct Registration {
    registry: Registry,
    key: CacheKey,
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.registry).remove(&self.key);
    }
}

struct RenderJob {
    tiers: CacheTiers,
    processor: ImageProcessor,
    render_timeout: Duration,
    fingerprint: Fingerprint,
}

impl RenderJob {
    async fn run<F, Fut>(
        self,
        render: F,
        registration: Registration,
        sender: watch::Sender<Option<RenderOutcome>>,
    ) where
        F: FnOnce(RenderRequest) -> Fut + Send + 'static,
        Fut: Future<Output = RenderOutcome> + Send + 'static,
    {
        let outcome = self.produce(render).await;

        if let Err(e) = &outcome {
            counter!(METRIC_RENDER_FAILED, "kind" => failure_kind(e)).increment(1);
            warn!("Render failed for {}: {}", self.fingerprint.url, e);
        }

        drop(registration);
        sender.send_replace(Some(outcome));
    }

    async fn produce<F, Fut>(&self, render: F) -> RenderOutcome
    where
        F: FnOnce(RenderRequest) -> Fut,
        Fut: Future<Output = RenderOutcome>,
    {
        let fp = &self.fingerprint;

        // a previous render may have finished between the caller's lookup and registration
        if let Some(payload) = CacheTiers::read(self.tiers.disk.as_ref(), &fp.key).await {
            return Ok(payload);
        }

        counter!(METRIC_RENDER_STARTED).increment(1);
        info!(
            "Rendering {} at {}s ({}x{})",
            fp.url, fp.timestamp, fp.width, fp.height
        );
        let started = Instant::now();

        let request = RenderRequest {
            url: fp.url.clone(),
            timestamp: fp.timestamp,
            viewport: fp.viewport(),
            timeout: self.render_timeout,
        };

        let raw = match tokio::time::timeout(self.render_timeout, render(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(RenderError::Timeout(self.render_timeout)),
        };

        let processor = self.processor;
        let (width, height) = (fp.width, fp.height);
        let payload = tokio::task::spawn_blocking(move || processor.optimize(raw, width, height))
            .await
            .map_err(|e| RenderError::Failed(format!("image processing aborted: {e}")))?;

        self.tiers.put(&fp.key, payload.clone()).await;

        info!(
            "Rendered {} in {}ms ({} bytes)",
            fp.key,
            started.elapsed().as_millis(),
            payload.len()
        );
        Ok(payload)
    }
}

fn failure_kind(error: &RenderError) -> &'static str {
    match error {
        RenderError::Timeout(_) => "timeout",
        RenderError::NavigationFailed(_) => "navigation",
        RenderError::Unsupported(_) => "unsupported",
        RenderError::Failed(_) => "failed",
    }
}
