//! Handler for the screenshot endpoint.

use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderName, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::time::Duration;
use validator::Validate;

use crate::api::dto::capture::CaptureParams;
use crate::domain::entities::CacheKey;
use crate::error::AppError;
use crate::state::AppState;

const X_CACHE_KEY: HeaderName = HeaderName::from_static("x-cache-key");

/// Returns a video frame as an image.
///
/// # Endpoint
///
/// `GET /screenshot?url={url}&t={seconds}&w={width}&h={height}`
///
/// # Request Flow
///
/// 1. Validate parameters and the site filter (no browser work on failure)
/// 2. Disk cache, then distributed cache
/// 3. On a miss, join or start the single render for this fingerprint
///
/// # Response
///
/// `200 image/jpeg` with `Cache-Control`, `Content-Disposition` and
/// `X-Cache-Key` headers.
///
/// # Errors
///
/// - 400 on invalid parameters or unsupported site
/// - 502 when the browser fails
/// - 504 when the render times out
pub async fn screenshot_handler(
    State(state): State<AppState>,
    params: Result<Query<CaptureParams>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params?;
    params.validate()?;

    let (fingerprint, payload) = state
        .screenshot_service
        .screenshot(&params.url, params.timestamp(), params.w, params.h)
        .await?;

    Ok(image_response(&fingerprint.key, payload, state.cache_ttl))
}

/// Builds the image response shared by `/screenshot` and `/cache/{key}`.
pub(crate) fn image_response(key: &CacheKey, payload: Bytes, ttl: Duration) -> Response {
    let content_type = image::guess_format(&payload)
        .map(|format| format.to_mime_type())
        .unwrap_or("image/jpeg");

    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CACHE_CONTROL,
                format!("public, max-age={}", ttl.as_secs()),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename={key}.jpg"),
            ),
            (X_CACHE_KEY, key.to_string()),
        ],
        payload,
    )
        .into_response()
}
