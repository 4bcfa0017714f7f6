//! DTOs for the link shortening endpoint.

use serde::Serialize;

use crate::domain::entities::VideoMetadata;

/// Response for `POST /shorten`.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub timestamp: u64,
    /// Regenerates the image on demand, so it keeps working after the
    /// cached copy expires.
    pub screenshot_url: String,
    pub metadata: VideoMetadata,
}
