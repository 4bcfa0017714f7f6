//! Domain layer containing business entities and the seams to external systems.
//!
//! Nothing here knows about HTTP, Redis or the filesystem.
//!
//! # Architecture
//!
//! - [`entities`] - Cache keys, short links and page metadata
//! - [`repositories`] - Link storage contract
//! - [`capture`] - Browser render capability and its error taxonomy
//! - [`metadata`] - Page metadata extraction capability
//!
//! # Screenshot Flow
//!
//! 1. The HTTP layer turns query parameters into a [`entities::Fingerprint`]
//! 2. The render coordinator looks the fingerprint's key up in the cache tiers
//! 3. On a miss, exactly one [`capture::Renderer::render`] call runs per key
//! 4. The processed image is written through to every tier

pub mod capture;
pub mod entities;
pub mod metadata;
pub mod repositories;
