//! # framelink
//!
//! Timestamped video screenshots and preview-aware short links, built with Axum.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, the link store contract and render/metadata seams
//! - **Application Layer** ([`application`]) - Fingerprinting, render coordination, link logic
//! - **Infrastructure Layer** ([`infrastructure`]) - Disk/Redis caches, link file, browser, HTML scraping
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Screenshot of a video frame at any timestamp via a headless browser
//! - Two cache tiers: local disk (always) and Redis (optional)
//! - At most one render per screenshot at a time, concurrent requests share it
//! - Short links that redirect humans and show an OpenGraph preview to bots
//! - Rate limiting and observability
//!
//! ## Quick Start
//!
//! ```bash
//! # Headless browser with a /function endpoint
//! export BROWSER_URL="http://localhost:3000"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! # Start the service
//! cargo run
//!
//! curl -o frame.jpg "http://localhost:8000/screenshot?url=https://vimeo.com/76979871&t=42"
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod telemetry;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        CaptureLimits, FingerprintBuilder, LinkService, RenderCoordinator, ScreenshotService,
    };
    pub use crate::domain::capture::{RenderError, RenderRequest, Renderer, Viewport};
    pub use crate::domain::entities::{CacheKey, Fingerprint, ShortLink, VideoMetadata};
    pub use crate::error::AppError;
    pub use crate::state::AppState;
}
