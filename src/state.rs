//! Shared application state injected into handlers.

use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::application::services::{LinkService, ScreenshotService};
use crate::domain::entities::ShortLink;
use crate::domain::metadata::MetadataExtractor;
use crate::infrastructure::persistence::FileLinkRepository;

#[derive(Clone)]
pub struct AppState {
    pub screenshot_service: Arc<ScreenshotService>,
    pub link_service: Arc<LinkService<FileLinkRepository>>,
    pub metadata_extractor: Arc<dyn MetadataExtractor>,
    /// Public origin used to build absolute URLs, without trailing slash.
    pub base_url: String,
    /// Advertised in `Cache-Control` of image responses.
    pub cache_ttl: Duration,
}

impl AppState {
    pub fn short_url(&self, short_id: &str) -> String {
        self.link_service.get_short_url(&self.base_url, short_id)
    }

    /// URL that renders (or serves from cache) the screenshot of a link.
    pub fn screenshot_url(&self, link: &ShortLink) -> String {
        let endpoint = format!("{}/screenshot", self.base_url.trim_end_matches('/'));
        let timestamp = link.timestamp.to_string();
        let width = link.width.to_string();
        let height = link.height.to_string();

        Url::parse_with_params(
            &endpoint,
            &[
                ("url", link.destination_url.as_str()),
                ("t", timestamp.as_str()),
                ("w", width.as_str()),
                ("h", height.as_str()),
            ],
        )
        .map(String::from)
        .unwrap_or(endpoint)
    }
}
