//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! cache tiers and the renderer. Services consume domain traits and provide
//! a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::fingerprint::FingerprintBuilder`] - Request validation and cache keys
//! - [`services::render_coordinator::RenderCoordinator`] - Cache tiers and single-flight renders
//! - [`services::screenshot_service::ScreenshotService`] - Site filter and screenshot retrieval
//! - [`services::link_service::LinkService`] - Short link creation and retrieval

pub mod services;
