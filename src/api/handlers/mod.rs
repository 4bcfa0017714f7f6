//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod cache;
pub mod health;
pub mod links;
pub mod redirect;
pub mod screenshot;
pub mod service_info;
pub mod shorten;

pub use cache::{clear_cache_handler, delete_cached_handler, get_cached_handler};
pub use health::health_handler;
pub use links::link_info_handler;
pub use redirect::redirect_handler;
pub use screenshot::screenshot_handler;
pub use service_info::service_info_handler;
pub use shorten::shorten_handler;
