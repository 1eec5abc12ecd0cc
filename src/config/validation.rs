//! Configuration validation.
//!
//! This module provides validation logic for configuration values,
//! ensuring they are within acceptable ranges.

use super::Config;
use crate::error::ConfigError;

/// Minimum allowed timer interval in seconds.
pub const MIN_INTERVAL_SECS: u64 = 5;

/// Maximum allowed timer interval in seconds (one week).
pub const MAX_INTERVAL_SECS: u64 = 604_800;

/// Validate configuration values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if any value is out of range:
/// - `REPORTS_DIR` must not be empty
/// - Every timer interval must be between 5 and 604800 seconds
#[must_use = "validation result should be checked"]
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Reports directory must not be empty
    if config.reports_dir.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            var: "REPORTS_DIR".into(),
            reason: "must not be empty".into(),
        });
    }

    validate_interval(
        "SYSTEM_METRICS_INTERVAL_SECS",
        config.system_metrics_interval_secs,
    )?;
    validate_interval(
        "DERIVED_METRICS_INTERVAL_SECS",
        config.derived_metrics_interval_secs,
    )?;
    validate_interval(
        "DAILY_REPORT_INTERVAL_SECS",
        config.daily_report_interval_secs,
    )?;

    Ok(())
}

/// Check a single timer interval against the allowed range.
fn validate_interval(var: &str, value: u64) -> Result<(), ConfigError> {
    if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&value) {
        return Err(ConfigError::InvalidValue {
            var: var.into(),
            reason: format!("must be between {MIN_INTERVAL_SECS} and {MAX_INTERVAL_SECS} seconds"),
        });
    }
    Ok(())
}
