//! Page metadata extraction capability.

use async_trait::async_trait;

use crate::domain::entities::VideoMetadata;

/// Reads title, description and related fields from a video page.
///
/// Extraction is best effort: implementations never fail, they return
/// [`VideoMetadata::fallback_for`] when the page cannot be read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> VideoMetadata;
}
