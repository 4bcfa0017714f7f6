//! Validation and normalization of screenshot requests.

use serde_json::json;

use crate::domain::entities::Fingerprint;
use crate::error::AppError;
use crate::utils::url_normalizer::normalize_url;

/// Size bounds and defaults for captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    pub max_width: u32,
    pub max_height: u32,
    pub default_width: u32,
    pub default_height: u32,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            default_width: 1280,
            default_height: 720,
        }
    }
}

/// Turns raw `(url, t, w, h)` input into a [`Fingerprint`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintBuilder {
    limits: CaptureLimits,
}

impl FingerprintBuilder {
    pub fn new(limits: CaptureLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> CaptureLimits {
        self.limits
    }

    /// Validates and normalizes a screenshot request.
    ///
    /// Fractional timestamps are truncated to whole seconds. Missing width or
    /// height take the configured defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if:
    /// - `url` is not an absolute http(s) URL
    /// - `timestamp` is negative, NaN or infinite
    /// - width/height are outside `1..=max`
    pub fn build(
        &self,
        url: &str,
        timestamp: f64,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Fingerprint, AppError> {
        let normalized = normalize_url(url).map_err(|e| {
            AppError::bad_request(
                "Invalid URL",
                json!({ "field": "url", "reason": e.to_string() }),
            )
        })?;

        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(AppError::bad_request(
                "Timestamp must be a non-negative number of seconds",
                json!({ "field": "t", "value": timestamp.to_string() }),
            ));
        }
        // in range: checked finite and non-negative above
        let seconds = timestamp.trunc() as u64;

        let width = width.unwrap_or(self.limits.default_width);
        let height = height.unwrap_or(self.limits.default_height);
        check_dimension("w", width, self.limits.max_width)?;
        check_dimension("h", height, self.limits.max_height)?;

        Ok(Fingerprint::new(normalized, seconds, width, height))
    }
}

fn check_dimension(field: &str, value: u32, max: u32) -> Result<(), AppError> {
    if (1..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::bad_request(
            format!("{field} must be between 1 and {max}"),
            json!({ "field": field, "value": value, "min": 1, "max": max }),
        ))
    }
}
