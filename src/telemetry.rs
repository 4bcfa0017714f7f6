//! Tracing subscriber setup and metric names.

use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_subscriber::EnvFilter;

pub const METRIC_CACHE_HIT: &str = "framelink_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "framelink_cache_miss_total";
pub const METRIC_RENDER_STARTED: &str = "framelink_render_started_total";
pub const METRIC_RENDER_FAILED: &str = "framelink_render_failed_total";
pub const METRIC_RENDER_JOINED: &str = "framelink_render_joined_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Installs the global tracing subscriber.
///
/// `log_format` is `json` for structured output, anything else gives
/// human-readable text. The filter comes from `RUST_LOG`, falling back to
/// `log_level`.
///
/// # Errors
///
/// Returns an error if a subscriber is already installed.
pub fn init(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    describe_metrics();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    let installed = if log_format.eq_ignore_ascii_case("json") {
        builder
            .json()
            .with_current_span(true)
            .with_target(true)
            .try_init()
    } else {
        builder.with_target(true).try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_CACHE_HIT,
            Unit::Count,
            "Screenshot cache hits, labelled by tier."
        );
        describe_counter!(
            METRIC_CACHE_MISS,
            Unit::Count,
            "Screenshot requests that missed every cache tier."
        );
        describe_counter!(
            METRIC_RENDER_STARTED,
            Unit::Count,
            "Browser renders started."
        );
        describe_counter!(
            METRIC_RENDER_FAILED,
            Unit::Count,
            "Browser renders that failed, labelled by kind."
        );
        describe_counter!(
            METRIC_RENDER_JOINED,
            Unit::Count,
            "Requests that waited on a render already in flight."
        );
    });
}
