//! Metadata extraction from a page's `<head>`.

use crate::domain::entities::VideoMetadata;
use crate::domain::entities::video_metadata::{DEFAULT_TITLE, site_name_from_url};
use crate::domain::metadata::MetadataExtractor;
use async_trait::async_trait;
use lol_html::{RewriteStrSettings, element, rewrite_str, text};
use regex::Regex;
use reqwest::Client;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?$").unwrap()
});

/// Fetches pages over HTTP and reads their meta tags.
pub struct HtmlMetadataExtractor {
    client: Client,
}

impl HtmlMetadataExtractor {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl MetadataExtractor for HtmlMetadataExtractor {
    async fn extract(&self, url: &str) -> VideoMetadata {
        match self.fetch(url).await {
            Ok(html) => {
                let metadata = parse_metadata(&html, url);
                debug!("Metadata for {}: {:?}", url, metadata.title);
                metadata
            }
            Err(e) => {
                warn!("Metadata fetch failed for {}: {}", url, e);
                VideoMetadata::fallback_for(url)
            }
        }
    }
}

#[derive(Default)]
struct HeadState {
    title: Option<String>,
    title_closed: bool,
    // first value wins per key
    meta: HashMap<String, String>,
}

impl HeadState {
    fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.meta.get(*k))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// Reads [`VideoMetadata`] out of an HTML document.
///
/// Missing fields fall back the same way [`VideoMetadata::fallback_for`] does.
pub fn parse_metadata(html: &str, url: &str) -> VideoMetadata {
    let state = Rc::new(RefCell::new(HeadState::default()));

    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![
                text!("title", {
                    let state = Rc::clone(&state);
                    move |t| {
                        let mut state = state.borrow_mut();
                        if !state.title_closed {
                            state.title.get_or_insert_default().push_str(t.as_str());
                            if t.last_in_text_node() {
                                state.title_closed = true;
                            }
                        }
                        Ok(())
                    }
                }),
                element!("meta[content]", {
                    let state = Rc::clone(&state);
                    move |el| {
                        let key = el
                            .get_attribute("property")
                            .or_else(|| el.get_attribute("name"))
                            .or_else(|| el.get_attribute("itemprop"));
                        if let (Some(key), Some(content)) = (key, el.get_attribute("content")) {
                            state
                                .borrow_mut()
                                .meta
                                .entry(key.to_ascii_lowercase())
                                .or_insert_with(|| decode_entities(&content));
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    );

    if let Err(e) = result {
        warn!("Failed to parse page HTML for {}: {}", url, e);
        return VideoMetadata::fallback_for(url);
    }

    let state = state.borrow();

    let title = state
        .title
        .as_deref()
        .map(|t| decode_entities(t.trim()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    VideoMetadata {
        title,
        description: state.first(&["description", "og:description", "twitter:description"]),
        site_name: state
            .first(&["og:site_name"])
            .or_else(|| site_name_from_url(url)),
        duration_seconds: state
            .first(&["video:duration", "og:video:duration", "duration"])
            .and_then(|d| parse_duration(&d)),
        thumbnail_url: state.first(&["og:image", "twitter:image"]),
    }
}

/// Parses plain seconds (`"93.5"`) or an ISO-8601 time duration (`"PT1M33S"`).
fn parse_duration(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Ok(seconds) = raw.parse::<f64>() {
        return (seconds.is_finite() && seconds >= 0.0).then_some(seconds);
    }

    let caps = ISO_DURATION_REGEX.captures(raw)?;
    if caps.iter().skip(1).all(|c| c.is_none()) {
        return None;
    }
    let part = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };
    Some(part(1) * 3600.0 + part(2) * 60.0 + part(3))
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
