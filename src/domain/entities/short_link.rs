//! Short link entity mapping a short id to a timestamped video URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{CacheKey, VideoMetadata};

/// A stored short link with its capture parameters.
///
/// The destination and capture parameters never change once created; only
/// the click counter moves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    pub short_id: String,
    pub destination_url: String,
    pub timestamp: u64,
    pub width: u32,
    pub height: u32,
    pub screenshot_key: CacheKey,
    pub metadata: VideoMetadata,
    pub created_at: DateTime<Utc>,
    /// Times the link was resolved, previews included.
    #[serde(default)]
    pub clicks: u64,
}

impl ShortLink {
    /// Builds a stored link from creation input, stamped with `created_at`.
    pub fn from_new(new_link: NewShortLink, created_at: DateTime<Utc>) -> Self {
        Self {
            short_id: new_link.short_id,
            destination_url: new_link.destination_url,
            timestamp: new_link.timestamp,
            width: new_link.width,
            height: new_link.height,
            screenshot_key: new_link.screenshot_key,
            metadata: new_link.metadata,
            created_at,
            clicks: 0,
        }
    }

    /// Destination URL with the timestamp encoded the way the platform expects.
    ///
    /// YouTube gets a `t={n}s` query parameter, Vimeo a `#t={n}s` fragment.
    /// Other platforms (and timestamp 0) get the stored URL unchanged.
    pub fn redirect_url(&self) -> String {
        if self.timestamp == 0 {
            return self.destination_url.clone();
        }
        let Ok(mut url) = Url::parse(&self.destination_url) else {
            return self.destination_url.clone();
        };

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let offset = format!("{}s", self.timestamp);

        if on_domain(&host, "youtube.com") || on_domain(&host, "youtu.be") {
            url.query_pairs_mut().append_pair("t", &offset);
        } else if on_domain(&host, "vimeo.com") {
            url.set_fragment(Some(&format!("t={offset}")));
        } else {
            return self.destination_url.clone();
        }

        url.into()
    }

    /// Human label such as `" at 1:05"`, empty for timestamp 0.
    pub fn timestamp_label(&self) -> String {
        if self.timestamp == 0 {
            return String::new();
        }
        let minutes = self.timestamp / 60;
        let seconds = self.timestamp % 60;
        format!(" at {minutes}:{seconds:02}")
    }
}

fn on_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Input data for creating a new short link.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShortLink {
    pub short_id: String,
    pub destination_url: String,
    pub timestamp: u64,
    pub width: u32,
    pub height: u32,
    pub screenshot_key: CacheKey,
    pub metadata: VideoMetadata,
}
