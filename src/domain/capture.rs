//! Browser render capability.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Requested capture size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A single capture request handed to a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub url: String,
    pub timestamp: u64,
    pub viewport: Viewport,
    /// Budget the renderer should abort its own work after.
    pub timeout: Duration,
}

/// Why a render produced no image.
///
/// Cloneable so a single failure can be handed to every caller waiting on
/// the same render.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("render timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("unsupported page: {0}")]
    Unsupported(String),

    #[error("render failed: {0}")]
    Failed(String),
}

/// Captures a video frame as encoded image bytes.
///
/// Implementations are expected to stop their own work once
/// [`RenderRequest::timeout`] has elapsed; callers additionally enforce the
/// timeout on their side and never wait longer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, request: RenderRequest) -> Result<Bytes, RenderError>;
}
