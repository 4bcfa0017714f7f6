//! Core domain entities.
//!
//! # Entity Types
//!
//! - [`CacheKey`] / [`Fingerprint`] - Identity of a screenshot request
//! - [`ShortLink`] - A short id pointing at a timestamped video
//! - [`VideoMetadata`] - Title and description scraped from the video page
//!
//! Creation input is kept separate from the stored form (`NewShortLink`
//! vs `ShortLink`), the store stamps `created_at`.

pub mod cache_key;
pub mod short_link;
pub mod video_metadata;

pub use cache_key::{CacheKey, Fingerprint};
pub use short_link::{NewShortLink, ShortLink};
pub use video_metadata::VideoMetadata;
