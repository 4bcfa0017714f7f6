//! Headless browser collaborator.

mod browser_renderer;

pub use browser_renderer::BrowserRenderer;
