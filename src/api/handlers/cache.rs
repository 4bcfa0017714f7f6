//! Handlers for cache management endpoints.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde_json::json;
use tracing::info;

use crate::api::dto::cache::{CacheClearResponse, CacheDeleteResponse};
use crate::api::handlers::screenshot::image_response;
use crate::domain::entities::CacheKey;
use crate::error::AppError;
use crate::state::AppState;

/// Serves a cached screenshot by key. Never renders.
///
/// # Endpoint
///
/// `GET /cache/{key}` (a trailing `.jpg` is accepted)
///
/// # Errors
///
/// Returns 400 for a malformed key and 404 when no tier holds it.
pub async fn get_cached_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let key = CacheKey::parse(&key)?;

    let payload = state
        .screenshot_service
        .cached(&key)
        .await
        .ok_or_else(|| AppError::not_found("Screenshot not cached", json!({ "key": key })))?;

    Ok(image_response(&key, payload, state.cache_ttl))
}

/// Removes one key from every cache tier.
///
/// # Endpoint
///
/// `DELETE /cache/{key}`
///
/// Idempotent: deleting an absent key returns `removed: false`.
pub async fn delete_cached_handler(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CacheDeleteResponse>, AppError> {
    let key = CacheKey::parse(&key)?;
    let removed = state.screenshot_service.invalidate(&key).await;

    info!("Cache entry {} invalidated (removed: {})", key, removed);

    Ok(Json(CacheDeleteResponse {
        key: key.to_string(),
        removed,
    }))
}

/// Clears every cache tier.
///
/// # Endpoint
///
/// `DELETE /cache`
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<CacheClearResponse> {
    let cleared = state.screenshot_service.clear().await;

    info!("Cache cleared ({} entries)", cleared);

    Json(CacheClearResponse { cleared })
}
