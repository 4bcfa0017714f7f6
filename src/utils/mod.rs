//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short id generation and validation
//! - [`url_normalizer`] - URL normalization for cache fingerprints
//! - [`video_url`] - Known video platform detection
//! - [`user_agent`] - Bot detection for link previews

pub mod code_generator;
pub mod url_normalizer;
pub mod user_agent;
pub mod video_url;
