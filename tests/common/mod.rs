#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use framelink::application::services::{
    CaptureLimits, CacheTiers, FingerprintBuilder, LinkService, RenderCoordinator,
    ScreenshotService,
};
use framelink::domain::capture::{RenderError, RenderRequest, Renderer};
use framelink::domain::entities::{ShortLink, VideoMetadata};
use framelink::domain::metadata::MetadataExtractor;
use framelink::infrastructure::cache::{CacheService, DiskCache, NullCache};
use framelink::infrastructure::imaging::ImageProcessor;
use framelink::infrastructure::persistence::FileLinkRepository;
use framelink::state::AppState;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

pub const BASE_URL: &str = "http://frames.test";
pub const VIDEO_URL: &str = "https://vimeo.com/76979871";
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// A small solid PNG of the requested size.
pub fn png_frame(width: u32, height: u32) -> Bytes {
    let img = RgbImage::from_pixel(width.min(64), height.min(64), Rgb([200, 30, 30]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    Bytes::from(buf.into_inner())
}

/// Renderer that returns a PNG (or a fixed error) and counts calls.
pub struct CountingRenderer {
    calls: AtomicUsize,
    delay: Duration,
    failure: Mutex<Option<RenderError>>,
    last_request: Mutex<Option<RenderRequest>>,
}

impl CountingRenderer {
    pub fn new() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay,
            failure: Mutex::new(None),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing(error: RenderError) -> Self {
        let renderer = Self::new();
        *renderer.failure.lock().unwrap() = Some(error);
        renderer
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<RenderRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for CountingRenderer {
    async fn render(&self, request: RenderRequest) -> Result<Bytes, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }

        Ok(png_frame(request.viewport.width, request.viewport.height))
    }
}

/// Metadata extractor that always returns the same title.
pub struct FixedMetadataExtractor;

#[async_trait]
impl MetadataExtractor for FixedMetadataExtractor {
    async fn extract(&self, url: &str) -> VideoMetadata {
        let mut metadata = VideoMetadata::fallback_for(url);
        metadata.title = "Big Buck Bunny".to_string();
        metadata.description = Some("A giant rabbit".to_string());
        metadata
    }
}

/// Application state over temp directories. Keep it alive for the test's
/// duration; dropping it removes the directories.
pub struct TestContext {
    pub state: AppState,
    pub renderer: Arc<CountingRenderer>,
    pub disk: Arc<DiskCache>,
    pub dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_renderer(CountingRenderer::new()).await
    }

    pub async fn with_renderer(renderer: CountingRenderer) -> Self {
        Self::build(renderer, Duration::from_secs(5)).await
    }

    pub async fn build(renderer: CountingRenderer, render_timeout: Duration) -> Self {
        let dir = TempDir::new().unwrap();
        let renderer = Arc::new(renderer);

        let disk = Arc::new(
            DiskCache::open(dir.path().join("cache"), CACHE_TTL)
                .await
                .unwrap(),
        );
        let distributed: Arc<dyn CacheService> = Arc::new(NullCache::new());
        let tiers = CacheTiers::new(disk.clone(), distributed);

        let coordinator = RenderCoordinator::new(tiers, ImageProcessor::default(), render_timeout);

        let screenshot_service = ScreenshotService::new(
            FingerprintBuilder::new(CaptureLimits::default()),
            coordinator,
            renderer.clone(),
            true,
        );

        let links = FileLinkRepository::open(dir.path().join("links").join("links.json"))
            .await
            .unwrap();

        let state = AppState {
            screenshot_service: Arc::new(screenshot_service),
            link_service: Arc::new(LinkService::new(Arc::new(links))),
            metadata_extractor: Arc::new(FixedMetadataExtractor),
            base_url: BASE_URL.to_string(),
            cache_ttl: CACHE_TTL,
        };

        Self {
            state,
            renderer,
            disk,
            dir,
        }
    }

    /// The link file the state's repository writes to.
    pub fn links_file(&self) -> std::path::PathBuf {
        self.dir.path().join("links").join("links.json")
    }

    /// Stores a link for `url` at `timestamp` without rendering.
    pub async fn create_link(&self, url: &str, timestamp: f64) -> ShortLink {
        let fingerprint = self
            .state
            .screenshot_service
            .fingerprint(url, timestamp, None, None)
            .unwrap();
        let metadata = FixedMetadataExtractor.extract(&fingerprint.url).await;
        self.state
            .link_service
            .create_short_link(&fingerprint, metadata)
            .await
            .unwrap()
    }
}
