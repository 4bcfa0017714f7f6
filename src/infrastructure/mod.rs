//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for storage, caching and the browser.
//!
//! # Modules
//!
//! - [`cache`] - Screenshot cache tiers (disk, Redis, no-op)
//! - [`persistence`] - Flat-file link store
//! - [`browser`] - Headless browser renderer
//! - [`metadata`] - HTML metadata extractor
//! - [`imaging`] - JPEG post-processing of renders

pub mod browser;
pub mod cache;
pub mod imaging;
pub mod metadata;
pub mod persistence;
