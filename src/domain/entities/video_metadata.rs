//! Metadata scraped from a video page.

use serde::{Deserialize, Serialize};
use url::Url;

/// Title used when a page exposes none.
pub const DEFAULT_TITLE: &str = "Video";

/// Descriptive fields of a video page, used for link previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl VideoMetadata {
    /// Metadata derived from the URL alone: default title, host as site name.
    pub fn fallback_for(url: &str) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: None,
            site_name: site_name_from_url(url),
            duration_seconds: None,
            thumbnail_url: None,
        }
    }
}

/// Host of `url` without a leading `www.`.
pub fn site_name_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_uses_host_without_www() {
        let meta = VideoMetadata::fallback_for("https://www.youtube.com/watch?v=x");
        assert_eq!(meta.title, "Video");
        assert_eq!(meta.site_name.as_deref(), Some("youtube.com"));
        assert!(meta.description.is_none());
    }

    #[test]
    fn test_fallback_for_garbage_url() {
        let meta = VideoMetadata::fallback_for("not a url");
        assert_eq!(meta.title, "Video");
        assert!(meta.site_name.is_none());
    }

    #[test]
    fn test_deserialize_with_missing_optionals() {
        let meta: VideoMetadata = serde_json::from_str(r#"{"title":"Clip"}"#).unwrap();
        assert_eq!(meta.title, "Clip");
        assert!(meta.thumbnail_url.is_none());
    }
}
