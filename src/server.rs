//! HTTP server initialization and runtime setup.
//!
//! Builds the cache tiers, link store and browser collaborators, wires them
//! into [`AppState`] and runs the Axum server.

use crate::application::services::{
    CacheTiers, FingerprintBuilder, LinkService, RenderCoordinator, ScreenshotService,
};
use crate::config::Config;
use crate::infrastructure::browser::BrowserRenderer;
use crate::infrastructure::cache::{CacheService, DiskCache, NullCache, RedisCache};
use crate::infrastructure::imaging::ImageProcessor;
use crate::infrastructure::metadata::HtmlMetadataExtractor;
use crate::infrastructure::persistence::FileLinkRepository;
use crate::routes::{RateLimit, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Connects the Redis tier, or falls back to [`NullCache`].
///
/// A configured but unreachable Redis is not fatal: the service runs
/// disk-only and `/health` reports the tier as failing.
async fn distributed_tier(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Distributed cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.cache_ttl()).await {
        Ok(redis) => {
            tracing::info!("Distributed cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Builds the shared application state from configuration.
///
/// # Errors
///
/// Returns an error if the cache directory or link file cannot be opened,
/// or an HTTP client cannot be built.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let disk = DiskCache::open(&config.cache_dir, config.cache_ttl())
        .await
        .with_context(|| format!("Failed to open cache dir {}", config.cache_dir.display()))?;

    let tiers = CacheTiers::new(Arc::new(disk), distributed_tier(config).await);

    let coordinator = RenderCoordinator::new(
        tiers,
        ImageProcessor::new(config.jpeg_quality),
        config.render_timeout(),
    );

    let renderer = BrowserRenderer::new(&config.browser_url, config.browser_token.as_deref())
        .context("Failed to build browser client")?;

    let screenshot_service = ScreenshotService::new(
        FingerprintBuilder::new(config.capture_limits()),
        coordinator,
        Arc::new(renderer),
        config.restrict_to_video_sites,
    );

    let links = FileLinkRepository::open(&config.links_file)
        .await
        .with_context(|| format!("Failed to open links file {}", config.links_file.display()))?;
    tracing::info!("Link store at {}", config.links_file.display());

    let metadata_extractor = HtmlMetadataExtractor::new(config.metadata_timeout())
        .context("Failed to build metadata client")?;

    Ok(AppState {
        screenshot_service: Arc::new(screenshot_service),
        link_service: Arc::new(LinkService::new(Arc::new(links))),
        metadata_extractor: Arc::new(metadata_extractor),
        base_url: config.base_url.clone(),
        cache_ttl: config.cache_ttl(),
    })
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Disk cache directory
/// - Redis cache (or NullCache fallback)
/// - Link store file
/// - Browser renderer and metadata extractor
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - State construction fails (see [`build_state`])
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let state = build_state(&config).await?;

    let app = app_router(
        state,
        RateLimit {
            per_second: config.rate_limit_per_second,
            burst: config.rate_limit_burst,
        },
    );

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
