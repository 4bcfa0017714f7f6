//! Page metadata collaborator.

mod html_metadata;

pub use html_metadata::{HtmlMetadataExtractor, parse_metadata};
