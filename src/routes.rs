//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /screenshot`, `POST /shorten` - Render endpoints (rate limited)
//! - `/s/*`, `/cache/*`, `/health`, `/api` - Everything else (unthrottled)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Permissive, the API is called from browser front ends
//! - **Rate limiting** - Per-IP token bucket on the render endpoints
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Per-IP token bucket settings for the render endpoints.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `rate_limit` - applied to `/screenshot` and `/shorten` only
pub fn app_router(state: AppState, rate_limit: RateLimit) -> NormalizePath<Router> {
    let render_routes = api::routes::rate_limited_routes()
        .layer(rate_limit::layer(rate_limit.per_second, rate_limit.burst));

    let router = Router::new()
        .merge(render_routes)
        .merge(api::routes::public_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
