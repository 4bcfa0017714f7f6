//! Screenshot retrieval: validation, site filter, cached render.

use bytes::Bytes;
use serde_json::json;
use std::sync::Arc;

use crate::application::services::fingerprint::FingerprintBuilder;
use crate::application::services::render_coordinator::RenderCoordinator;
use crate::domain::capture::Renderer;
use crate::domain::entities::{CacheKey, Fingerprint};
use crate::error::AppError;
use crate::utils::video_url::is_supported_video_url;

/// Entry point for everything screenshot related.
///
/// Validation and the site filter run before any cache or browser work.
pub struct ScreenshotService {
    fingerprints: FingerprintBuilder,
    coordinator: RenderCoordinator,
    renderer: Arc<dyn Renderer>,
    restrict_to_video_sites: bool,
}

impl ScreenshotService {
    pub fn new(
        fingerprints: FingerprintBuilder,
        coordinator: RenderCoordinator,
        renderer: Arc<dyn Renderer>,
        restrict_to_video_sites: bool,
    ) -> Self {
        Self {
            fingerprints,
            coordinator,
            renderer,
            restrict_to_video_sites,
        }
    }

    pub fn coordinator(&self) -> &RenderCoordinator {
        &self.coordinator
    }

    /// Validates a request and derives its fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed input and
    /// [`AppError::UnsupportedSite`] when the site filter is enabled and the
    /// URL is not a known video page.
    pub fn fingerprint(
        &self,
        url: &str,
        timestamp: f64,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Fingerprint, AppError> {
        let fingerprint = self.fingerprints.build(url, timestamp, width, height)?;

        if self.restrict_to_video_sites && !is_supported_video_url(&fingerprint.url) {
            return Err(AppError::unsupported_site(
                "URL is not a supported video page",
                json!({ "url": fingerprint.url }),
            ));
        }

        Ok(fingerprint)
    }

    /// Returns the screenshot for an already validated fingerprint.
    ///
    /// # Errors
    ///
    /// Render failures map to [`AppError::RenderTimeout`],
    /// [`AppError::RenderFailed`] or [`AppError::UnsupportedSite`].
    pub async fn capture(&self, fingerprint: &Fingerprint) -> Result<Bytes, AppError> {
        let renderer = Arc::clone(&self.renderer);
        let payload = self
            .coordinator
            .resolve(fingerprint, move |request| async move {
                renderer.render(request).await
            })
            .await?;
        Ok(payload)
    }

    /// Validates, then captures.
    ///
    /// # Errors
    ///
    /// See [`Self::fingerprint`] and [`Self::capture`].
    pub async fn screenshot(
        &self,
        url: &str,
        timestamp: f64,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<(Fingerprint, Bytes), AppError> {
        let fingerprint = self.fingerprint(url, timestamp, width, height)?;
        let payload = self.capture(&fingerprint).await?;
        Ok((fingerprint, payload))
    }

    /// Cached screenshot for a key; never renders.
    pub async fn cached(&self, key: &CacheKey) -> Option<Bytes> {
        self.coordinator.cached(key).await
    }

    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        self.coordinator.invalidate(key).await
    }

    pub async fn clear(&self) -> usize {
        self.coordinator.clear().await
    }
}
