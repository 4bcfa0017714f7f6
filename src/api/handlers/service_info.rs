//! Handler for the service info endpoint.

use axum::Json;

use crate::api::dto::service_info::{EndpointInfo, ServiceInfoResponse};

const ENDPOINTS: &[(&str, &str, &str)] = &[
    ("GET", "/screenshot", "Video frame at a timestamp as JPEG"),
    ("POST", "/shorten", "Create a short link with a preview screenshot"),
    ("GET", "/s/{short_id}", "Redirect, or OpenGraph preview for bots"),
    ("GET", "/s/{short_id}/info", "Short link details"),
    ("GET", "/cache/{key}", "Cached screenshot by key"),
    ("DELETE", "/cache/{key}", "Remove one cached screenshot"),
    ("DELETE", "/cache", "Clear the screenshot cache"),
    ("GET", "/health", "Component health"),
];

/// Describes the service and its endpoints.
///
/// # Endpoint
///
/// `GET /api`
pub async fn service_info_handler() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        service: env!("CARGO_PKG_NAME"),
        description: env!("CARGO_PKG_DESCRIPTION"),
        version: env!("CARGO_PKG_VERSION"),
        endpoints: ENDPOINTS
            .iter()
            .map(|&(method, path, description)| EndpointInfo {
                method,
                path,
                description,
            })
            .collect(),
    })
}
