//! Renderer backed by a Browserless-style headless Chrome endpoint.

use crate::domain::capture::{RenderError, RenderRequest, Renderer};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Puppeteer function executed remotely for every capture.
const CAPTURE_SCRIPT: &str = include_str!("capture.js");

/// Extra time granted to the HTTP round trip on top of the render budget.
const TRANSPORT_GRACE: Duration = Duration::from_secs(2);

pub struct BrowserRenderer {
    client: Client,
    endpoint: Url,
}

impl BrowserRenderer {
    /// Builds a renderer that posts to `{browser_url}/function`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built.
    pub fn new(browser_url: &str, token: Option<&str>) -> anyhow::Result<Self> {
        let mut base = Url::parse(browser_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut endpoint = base.join("function")?;
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            endpoint.query_pairs_mut().append_pair("token", token);
        }

        let client = Client::builder()
            .user_agent(concat!("framelink/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, request: RenderRequest) -> Result<Bytes, RenderError> {
        let timeout_ms = u64::try_from(request.timeout.as_millis()).unwrap_or(u64::MAX);
        let body = json!({
            "code": CAPTURE_SCRIPT,
            "context": {
                "url": request.url,
                "timestamp": request.timestamp,
                "width": request.viewport.width,
                "height": request.viewport.height,
                "timeoutMs": timeout_ms,
            }
        });

        debug!("Browser render request for {}", request.url);

        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(request.timeout + TRANSPORT_GRACE)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e, request.timeout))?;

        let status = response.status();
        if status.is_success() {
            return response
                .bytes()
                .await
                .map_err(|e| transport_error(&e, request.timeout));
        }

        let text = response.text().await.unwrap_or_default();
        warn!("Browser returned {} for {}: {}", status, request.url, text);
        Err(classify_failure(status, &text, request.timeout))
    }
}

fn transport_error(e: &reqwest::Error, timeout: Duration) -> RenderError {
    if e.is_timeout() {
        RenderError::Timeout(timeout)
    } else if e.is_connect() {
        RenderError::Failed(format!("browser unavailable: {e}"))
    } else {
        RenderError::Failed(e.to_string())
    }
}

/// Maps a failed browser response onto a [`RenderError`].
fn classify_failure(status: StatusCode, body: &str, timeout: Duration) -> RenderError {
    if matches!(
        status,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT
    ) {
        return RenderError::Timeout(timeout);
    }

    let lower = body.to_ascii_lowercase();
    let message = if body.trim().is_empty() {
        format!("browser returned {status}")
    } else {
        body.trim().to_string()
    };

    if lower.contains("no video") {
        RenderError::Unsupported(message)
    } else if lower.contains("navigation") || lower.contains("net::err") {
        RenderError::NavigationFailed(message)
    } else if lower.contains("timeout") || lower.contains("timed out") {
        RenderError::Timeout(timeout)
    } else {
        RenderError::Failed(message)
    }
}
