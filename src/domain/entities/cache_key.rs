//! Cache key and request fingerprint.

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::domain::capture::Viewport;
use crate::error::AppError;

/// Number of hex characters in a key (SHA-256 digest).
const KEY_LEN: usize = 64;

/// Deterministic identifier of a screenshot request.
///
/// Always 64 lowercase hex characters, which makes it safe to use as a file
/// name and as a Redis key suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for an already normalized request.
    pub fn derive(normalized_url: &str, timestamp: u64, width: u32, height: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{normalized_url}|{timestamp}|{width}|{height}").as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Parses a key received from outside (e.g. a URL path segment).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] unless the input is exactly 64
    /// lowercase hex characters. An optional `.jpg` suffix is accepted.
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let raw = input.strip_suffix(".jpg").unwrap_or(input);

        let well_formed = raw.len() == KEY_LEN
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));

        if !well_formed {
            return Err(AppError::bad_request(
                "Invalid cache key",
                json!({ "key": input, "expected": "64 lowercase hex characters" }),
            ));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated, normalized screenshot request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub url: String,
    pub timestamp: u64,
    pub width: u32,
    pub height: u32,
    pub key: CacheKey,
}

impl Fingerprint {
    pub fn new(url: String, timestamp: u64, width: u32, height: u32) -> Self {
        let key = CacheKey::derive(&url, timestamp, width, height);
        Self {
            url,
            timestamp,
            width,
            height,
            key,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }
}
