//! DTOs for short link lookup endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::VideoMetadata;

/// Response for `GET /s/{short_id}/info`.
#[derive(Debug, Serialize)]
pub struct LinkInfoResponse {
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub redirect_url: String,
    pub timestamp: u64,
    pub width: u32,
    pub height: u32,
    pub screenshot_key: String,
    pub screenshot_url: String,
    pub metadata: VideoMetadata,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
}

/// Query parameters of `GET /s/{short_id}`.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    /// Forces the OpenGraph preview page for any client.
    #[serde(default)]
    pub preview: Option<String>,
}

impl RedirectParams {
    pub fn wants_preview(&self) -> bool {
        matches!(
            self.preview.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("1" | "true" | "yes")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(preview: Option<&str>) -> RedirectParams {
        RedirectParams {
            preview: preview.map(str::to_string),
        }
    }

    #[test]
    fn test_wants_preview() {
        assert!(params(Some("1")).wants_preview());
        assert!(params(Some("TRUE")).wants_preview());
        assert!(!params(Some("0")).wants_preview());
        assert!(!params(None).wants_preview());
    }
}
