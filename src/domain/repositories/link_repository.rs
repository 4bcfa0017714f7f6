//! Repository trait for short link storage.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for short links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::FileLinkRepository`] - flat JSON file
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Stores a new link. The link must be durable once this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short id is already taken.
    /// Returns [`AppError::Internal`] if the link could not be persisted.
    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Returns `true` if a link with this id exists.
    async fn exists(&self, short_id: &str) -> Result<bool, AppError>;

    /// Lists all links, newest first.
    async fn list(&self) -> Result<Vec<ShortLink>, AppError>;

    /// Number of stored links.
    async fn count(&self) -> Result<usize, AppError>;

    /// Increments the click counter of a link and persists it.
    ///
    /// Returns the updated link, or `Ok(None)` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the change could not be persisted.
    async fn record_click(&self, short_id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Deletes a link.
    ///
    /// Returns `Ok(true)` if the link existed, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the change could not be persisted.
    async fn delete(&self, short_id: &str) -> Result<bool, AppError>;

    /// Checks that the backing storage is usable.
    async fn health_check(&self) -> bool;
}
