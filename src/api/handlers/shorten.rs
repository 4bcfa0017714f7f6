//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use tracing::info;
use validator::Validate;

use crate::api::dto::capture::CaptureParams;
use crate::api::dto::shorten::ShortenResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link with a preview screenshot.
///
/// # Endpoint
///
/// `POST /shorten?url={url}&t={seconds}&w={width}&h={height}`
///
/// # Request Flow
///
/// 1. Validate parameters and the site filter
/// 2. Capture the screenshot and read page metadata concurrently
/// 3. Store the link under a fresh random id
///
/// Metadata is best effort and falls back to the URL's host; a failed
/// screenshot fails the request and no link is stored.
///
/// # Response
///
/// ```json
/// {
///   "short_id": "Xk3_a9Qz",
///   "short_url": "https://t1.me/s/Xk3_a9Qz",
///   "original_url": "https://youtube.com/watch?v=abc",
///   "timestamp": 65,
///   "screenshot_url": "https://t1.me/screenshot?url=...&t=65&w=1280&h=720",
///   "metadata": { "title": "...", "site_name": "YouTube" }
/// }
/// ```
pub async fn shorten_handler(
    State(state): State<AppState>,
    params: Result<Query<CaptureParams>, QueryRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Query(params) = params?;
    params.validate()?;

    let fingerprint = state.screenshot_service.fingerprint(
        &params.url,
        params.timestamp(),
        params.w,
        params.h,
    )?;

    let (metadata, screenshot) = tokio::join!(
        state.metadata_extractor.extract(&fingerprint.url),
        state.screenshot_service.capture(&fingerprint),
    );
    screenshot?;

    let link = state
        .link_service
        .create_short_link(&fingerprint, metadata)
        .await?;

    info!("Short link {} -> {}", link.short_id, link.destination_url);

    Ok(Json(ShortenResponse {
        short_url: state.short_url(&link.short_id),
        screenshot_url: state.screenshot_url(&link),
        short_id: link.short_id,
        original_url: link.destination_url,
        timestamp: link.timestamp,
        metadata: link.metadata,
    }))
}
