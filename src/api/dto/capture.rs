//! Query parameters shared by the screenshot and shorten endpoints.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use validator::Validate;

/// `?url=&t=&w=&h=`
///
/// Uses `serde_with` to parse numbers from query strings; range checks happen
/// in the fingerprint builder so both endpoints share one set of rules.
#[serde_as]
#[derive(Debug, Deserialize, Validate)]
pub struct CaptureParams {
    /// Video page URL.
    #[validate(length(min = 1, max = 2048, message = "url must be 1-2048 characters"))]
    pub url: String,

    /// Timestamp in seconds, fractions allowed.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub t: Option<f64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub w: Option<u32>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub h: Option<u32>,
}

impl CaptureParams {
    pub fn timestamp(&self) -> f64 {
        self.t.unwrap_or(0.0)
    }
}
