//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: `healthy`, or `degraded` when only the distributed cache
///   is down (the service keeps working disk-only)
/// - **503 Service Unavailable**: `unhealthy`, the disk cache or the link
///   store is unusable
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "disk_cache": { "status": "ok", "message": "Writable" },
///     "distributed_cache": { "status": "disabled" },
///     "link_store": { "status": "ok", "message": "12 links" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let disk_check = check_disk_cache(&state).await;

    let distributed_check = check_distributed_cache(&state).await;

    let link_check = check_link_store(&state).await;

    let critical_failure = disk_check.is_error() || link_check.is_error();
    let status = if critical_failure {
        "unhealthy"
    } else if distributed_check.is_error() {
        "degraded"
    } else {
        "healthy"
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            disk_cache: disk_check,
            distributed_cache: distributed_check,
            link_store: link_check,
        },
    };

    if critical_failure {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    } else {
        Ok(Json(response))
    }
}

async fn check_disk_cache(state: &AppState) -> CheckStatus {
    let disk = &state.screenshot_service.coordinator().tiers().disk;
    if disk.health_check().await {
        CheckStatus::ok("Cache directory available")
    } else {
        CheckStatus::error("Cache directory unavailable")
    }
}

/// Checks the Redis tier via PING; reported as disabled when not configured.
async fn check_distributed_cache(state: &AppState) -> CheckStatus {
    let tier = &state.screenshot_service.coordinator().tiers().distributed;
    if tier.name() == "disabled" {
        return CheckStatus::disabled();
    }

    if tier.health_check().await {
        CheckStatus::ok("Redis connected")
    } else {
        CheckStatus::error("Redis connection failed")
    }
}

async fn check_link_store(state: &AppState) -> CheckStatus {
    if !state.link_service.health_check().await {
        return CheckStatus::error("Link store directory unavailable");
    }

    match state.link_service.count_links().await {
        Ok(count) => CheckStatus::ok(format!("{} links", count)),
        Err(e) => CheckStatus::error(format!("Link store error: {}", e)),
    }
}
