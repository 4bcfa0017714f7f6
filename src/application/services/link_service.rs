//! Short link creation and retrieval service.

use std::sync::Arc;

use crate::domain::entities::{Fingerprint, NewShortLink, ShortLink, VideoMetadata};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{generate_short_id, is_valid_short_id};
use serde_json::json;
use tracing::warn;

/// Attempts at finding a free short id before giving up.
const MAX_ATTEMPTS: usize = 10;

/// Service for creating and retrieving short links.
pub struct LinkService<L: LinkRepository> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Stores a short link for a validated screenshot request.
    ///
    /// # Code Generation
    ///
    /// Generates a random 8-character id and retries up to 10 times on
    /// collision. A collision that slips past the existence check (another
    /// writer took the id first) is retried the same way.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if no free id was found or the link
    /// could not be persisted.
    pub async fn create_short_link(
        &self,
        fingerprint: &Fingerprint,
        metadata: VideoMetadata,
    ) -> Result<ShortLink, AppError> {
        for _ in 0..MAX_ATTEMPTS {
            let short_id = generate_short_id();

            if self.link_repository.exists(&short_id).await? {
                continue;
            }

            let new_link = NewShortLink {
                short_id,
                destination_url: fingerprint.url.clone(),
                timestamp: fingerprint.timestamp,
                width: fingerprint.width,
                height: fingerprint.height,
                screenshot_key: fingerprint.key.clone(),
                metadata: metadata.clone(),
            };

            match self.link_repository.create(new_link).await {
                Err(AppError::Conflict { .. }) => continue,
                result => return result,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique short id",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Retrieves a link by its short id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn get_link(&self, short_id: &str) -> Result<ShortLink, AppError> {
        let not_found =
            || AppError::not_found("Short link not found", json!({ "short_id": short_id }));

        if !is_valid_short_id(short_id) {
            return Err(not_found());
        }

        self.link_repository
            .find_by_id(short_id)
            .await?
            .ok_or_else(not_found)
    }

    /// Retrieves a link for a visitor and counts the click.
    ///
    /// A click that cannot be persisted is logged and the link is still
    /// returned, so a storage hiccup never breaks a redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve_link(&self, short_id: &str) -> Result<ShortLink, AppError> {
        if !is_valid_short_id(short_id) {
            return self.get_link(short_id).await;
        }

        match self.link_repository.record_click(short_id).await {
            Ok(Some(link)) => Ok(link),
            Ok(None) => Err(AppError::not_found(
                "Short link not found",
                json!({ "short_id": short_id }),
            )),
            Err(e) => {
                warn!("Failed to record click for {}: {}", short_id, e);
                self.get_link(short_id).await
            }
        }
    }

    /// Deletes a link. Returns whether it existed.
    pub async fn delete_link(&self, short_id: &str) -> Result<bool, AppError> {
        self.link_repository.delete(short_id).await
    }

    /// All links, newest first.
    pub async fn list_links(&self) -> Result<Vec<ShortLink>, AppError> {
        self.link_repository.list().await
    }

    pub async fn count_links(&self) -> Result<usize, AppError> {
        self.link_repository.count().await
    }

    /// Constructs the public short URL for an id.
    pub fn get_short_url(&self, base_url: &str, short_id: &str) -> String {
        format!("{}/s/{}", base_url.trim_end_matches('/'), short_id)
    }

    pub async fn health_check(&self) -> bool {
        self.link_repository.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Utc;

    fn fingerprint() -> Fingerprint {
        Fingerprint::new("https://youtube.com/watch?v=abc".to_string(), 65, 1280, 720)
    }

    fn stored(new_link: NewShortLink) -> ShortLink {
        ShortLink::from_new(new_link, Utc::now())
    }

    #[tokio::test]
    async fn test_create_short_link_success() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .times(1)
            .returning(|_| Ok(false));
        mock_link_repo
            .expect_create()
            .withf(|new_link| {
                new_link.destination_url == "https://youtube.com/watch?v=abc"
                    && new_link.timestamp == 65
                    && new_link.short_id.len() == 8
            })
            .times(1)
            .returning(|new_link| Ok(stored(new_link)));

        let service = LinkService::new(Arc::new(mock_link_repo));
        let fp = fingerprint();

        let link = service
            .create_short_link(&fp, VideoMetadata::fallback_for(&fp.url))
            .await
            .unwrap();

        assert_eq!(link.screenshot_key, fp.key);
        assert_eq!(link.metadata.site_name.as_deref(), Some("youtube.com"));
    }

    #[tokio::test]
    async fn test_create_short_link_retries_on_collision() {
        let mut mock_link_repo = MockLinkRepository::new();

        let mut seen = 0;
        mock_link_repo.expect_exists().times(3).returning(move |_| {
            seen += 1;
            Ok(seen < 3)
        });
        mock_link_repo
            .expect_create()
            .times(1)
            .returning(|new_link| Ok(stored(new_link)));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service
            .create_short_link(&fingerprint(), VideoMetadata::fallback_for(""))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_short_link_retries_on_create_conflict() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .times(2)
            .returning(|_| Ok(false));
        let mut calls = 0;
        mock_link_repo.expect_create().times(2).returning(move |new_link| {
            calls += 1;
            if calls == 1 {
                Err(AppError::conflict("taken", json!({})))
            } else {
                Ok(stored(new_link))
            }
        });

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service
            .create_short_link(&fingerprint(), VideoMetadata::fallback_for(""))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_short_link_gives_up_after_max_attempts() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .times(MAX_ATTEMPTS)
            .returning(|_| Ok(true));
        mock_link_repo.expect_create().times(0);

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service
            .create_short_link(&fingerprint(), VideoMetadata::fallback_for(""))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_create_short_link_propagates_storage_error() {
        let mut mock_link_repo = MockLinkRepository::new();

        mock_link_repo
            .expect_exists()
            .times(1)
            .returning(|_| Ok(false));
        mock_link_repo
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::internal("disk full", json!({}))));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service
            .create_short_link(&fingerprint(), VideoMetadata::fallback_for(""))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_get_link_found() {
        let mut mock_link_repo = MockLinkRepository::new();
        let fp = fingerprint();
        let link = stored(NewShortLink {
            short_id: "AbCd-_12".to_string(),
            destination_url: fp.url.clone(),
            timestamp: fp.timestamp,
            width: fp.width,
            height: fp.height,
            screenshot_key: fp.key.clone(),
            metadata: VideoMetadata::fallback_for(&fp.url),
        });

        mock_link_repo
            .expect_find_by_id()
            .withf(|id| id == "AbCd-_12")
            .times(1)
            .returning(move |_| Ok(Some(link.clone())));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let found = service.get_link("AbCd-_12").await.unwrap();
        assert_eq!(found.destination_url, "https://youtube.com/watch?v=abc");
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service.get_link("missing1").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_link_malformed_id_skips_storage() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_find_by_id().times(0);

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service.get_link("../etc/passwd").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    fn stored_link(short_id: &str, clicks: u64) -> ShortLink {
        let fp = fingerprint();
        let mut link = stored(NewShortLink {
            short_id: short_id.to_string(),
            destination_url: fp.url.clone(),
            timestamp: fp.timestamp,
            width: fp.width,
            height: fp.height,
            screenshot_key: fp.key.clone(),
            metadata: VideoMetadata::fallback_for(&fp.url),
        });
        link.clicks = clicks;
        link
    }

    #[tokio::test]
    async fn test_resolve_link_records_click() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_record_click()
            .withf(|id| id == "AbCd-_12")
            .times(1)
            .returning(|id| Ok(Some(stored_link(id, 1))));
        mock_link_repo.expect_find_by_id().times(0);

        let service = LinkService::new(Arc::new(mock_link_repo));

        let link = service.resolve_link("AbCd-_12").await.unwrap();
        assert_eq!(link.clicks, 1);
    }

    #[tokio::test]
    async fn test_resolve_link_unknown() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_record_click()
            .times(1)
            .returning(|_| Ok(None));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service.resolve_link("missing1").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_link_survives_click_write_failure() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo
            .expect_record_click()
            .times(1)
            .returning(|_| Err(AppError::internal("disk full", json!({}))));
        mock_link_repo
            .expect_find_by_id()
            .times(1)
            .returning(|id| Ok(Some(stored_link(id, 4))));

        let service = LinkService::new(Arc::new(mock_link_repo));

        let link = service.resolve_link("AbCd-_12").await.unwrap();
        assert_eq!(link.clicks, 4);
    }

    #[tokio::test]
    async fn test_resolve_link_malformed_id_skips_storage() {
        let mut mock_link_repo = MockLinkRepository::new();
        mock_link_repo.expect_record_click().times(0);
        mock_link_repo.expect_find_by_id().times(0);

        let service = LinkService::new(Arc::new(mock_link_repo));

        let result = service.resolve_link("../etc/passwd").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound { .. }));
    }

    #[test]
    fn test_get_short_url() {
        let service = LinkService::new(Arc::new(MockLinkRepository::new()));
        assert_eq!(
            service.get_short_url("https://t1.me/", "abcd1234"),
            "https://t1.me/s/abcd1234"
        );
    }
}
