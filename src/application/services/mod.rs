//! Business logic services for the application layer.

pub mod fingerprint;
pub mod link_service;
pub mod render_coordinator;
pub mod screenshot_service;

pub use fingerprint::{CaptureLimits, FingerprintBuilder};
pub use link_service::LinkService;
pub use render_coordinator::{CacheTiers, RenderCoordinator};
pub use screenshot_service::ScreenshotService;
