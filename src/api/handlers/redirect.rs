//! Handler for short link resolution.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::debug;

use crate::api::dto::links::RedirectParams;
use crate::domain::entities::ShortLink;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::user_agent::is_bot_user_agent;

/// OpenGraph page served to link unfurlers.
///
/// Renders `templates/preview.html`.
#[derive(Template, WebTemplate)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub title: String,
    pub description: String,
    pub screenshot_url: String,
    pub short_url: String,
    pub destination_url: String,
    pub site_name: String,
    pub width: u32,
    pub height: u32,
    pub timestamp_label: String,
    pub published_at: String,
}

impl PreviewTemplate {
    fn for_link(state: &AppState, link: &ShortLink) -> Self {
        let label = link.timestamp_label();
        let metadata = &link.metadata;

        // unfurlers cache og:image aggressively; vary the URL per request
        let screenshot_url = format!(
            "{}&v={}",
            state.screenshot_url(link),
            Utc::now().timestamp()
        );

        Self {
            title: format!("{}{}", metadata.title, label),
            description: metadata
                .description
                .clone()
                .unwrap_or_else(|| format!("Watch this video{label}")),
            screenshot_url,
            short_url: state.short_url(&link.short_id),
            destination_url: link.redirect_url(),
            site_name: metadata
                .site_name
                .clone()
                .unwrap_or_else(|| "the video".to_string()),
            width: link.width,
            height: link.height,
            timestamp_label: label,
            published_at: link.created_at.to_rfc3339(),
        }
    }
}

/// Resolves a short link.
///
/// # Endpoint
///
/// `GET /s/{short_id}`
///
/// # Behavior
///
/// - Browsers get `302 Found` to the destination, with the timestamp encoded
///   for the platform (`t={n}s` on YouTube, `#t={n}s` on Vimeo)
/// - Bots and crawlers, or any client passing `?preview=1`, get an HTML page
///   with OpenGraph and Twitter card tags pointing at the screenshot
///
/// Both branches count as a click.
///
/// # Errors
///
/// Returns 404 Not Found if the id is unknown.
pub async fn redirect_handler(
    Path(short_id): Path<String>,
    Query(params): Query<RedirectParams>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let link = state.link_service.resolve_link(&short_id).await?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if params.wants_preview() || is_bot_user_agent(user_agent) {
        debug!("Serving preview for {} to {:?}", short_id, user_agent);
        return Ok(PreviewTemplate::for_link(&state, &link).into_response());
    }

    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, link.redirect_url())],
    )
        .into_response())
}
