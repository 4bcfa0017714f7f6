//! HTTP middleware for request processing and protection.
//!
//! Provides rate limiting for the render endpoints and request tracing.

pub mod rate_limit;
pub mod tracing;
