//! Handler for short link details.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::links::LinkInfoResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the stored details of a short link.
///
/// # Endpoint
///
/// `GET /s/{short_id}/info`
///
/// # Errors
///
/// Returns 404 Not Found if the id is unknown.
pub async fn link_info_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkInfoResponse>, AppError> {
    let link = state.link_service.get_link(&short_id).await?;

    Ok(Json(LinkInfoResponse {
        short_url: state.short_url(&link.short_id),
        screenshot_url: state.screenshot_url(&link),
        redirect_url: link.redirect_url(),
        screenshot_key: link.screenshot_key.to_string(),
        short_id: link.short_id,
        original_url: link.destination_url,
        timestamp: link.timestamp,
        width: link.width,
        height: link.height,
        metadata: link.metadata,
        clicks: link.clicks,
        created_at: link.created_at,
    }))
}
