//! API route configuration.
//!
//! Routes are split by cost: anything that may start a browser render is
//! grouped under [`rate_limited_routes`], everything else is in
//! [`public_routes`].

use crate::api::handlers::{
    clear_cache_handler, delete_cached_handler, get_cached_handler, health_handler,
    link_info_handler, redirect_handler, screenshot_handler, service_info_handler,
    shorten_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Endpoints that may trigger a render.
///
/// # Endpoints
///
/// - `GET  /screenshot` - Screenshot of a video frame (cached or rendered)
/// - `POST /shorten`    - Short link with screenshot and page metadata
pub fn rate_limited_routes() -> Router<AppState> {
    Router::new()
        .route("/screenshot", get(screenshot_handler))
        .route("/shorten", post(shorten_handler))
}

/// Endpoints that never render.
///
/// # Endpoints
///
/// - `GET    /s/{short_id}`      - Redirect or OpenGraph preview
/// - `GET    /s/{short_id}/info` - Short link details
/// - `GET    /cache/{key}`       - Cached screenshot by key
/// - `DELETE /cache/{key}`       - Remove one cached screenshot
/// - `DELETE /cache`             - Clear the screenshot cache
/// - `GET    /health`            - Component health
/// - `GET    /api`               - Service info and endpoint list
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/s/{short_id}", get(redirect_handler))
        .route("/s/{short_id}/info", get(link_info_handler))
        .route(
            "/cache/{key}",
            get(get_cached_handler).delete(delete_cached_handler),
        )
        .route("/cache", delete(clear_cache_handler))
        .route("/health", get(health_handler))
        .route("/api", get(service_info_handler))
}
