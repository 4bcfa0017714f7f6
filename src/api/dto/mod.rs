//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for serialization; query parameters are additionally
//! checked with validator.

pub mod cache;
pub mod capture;
pub mod health;
pub mod links;
pub mod service_info;
pub mod shorten;
