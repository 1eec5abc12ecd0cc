//! Configuration management.
//!
//! This module handles:
//! - Environment variable loading
//! - Configuration validation
//! - Default value handling
//!
//! # Example
//!
//! ```
//! use plant_telemetry::config::{Config, DEFAULT_REPORTS_DIR};
//!
//! // Create a config directly (use Config::from_env() in production)
//! let config = Config {
//!     reports_dir: DEFAULT_REPORTS_DIR.to_string(),
//!     log_level: "info".to_string(),
//!     system_metrics_interval_secs: 60,
//!     derived_metrics_interval_secs: 300,
//!     daily_report_interval_secs: 86_400,
//! };
//!
//! assert_eq!(config.reports_dir, "./data/reports");
//! ```

mod validation;

pub use validation::{
    validate_config, MAX_INTERVAL_SECS, MIN_INTERVAL_SECS,
};

use crate::error::ConfigError;

/// Default reports directory.
pub const DEFAULT_REPORTS_DIR: &str = "./data/reports";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default system-metrics snapshot interval (one minute).
pub const DEFAULT_SYSTEM_METRICS_INTERVAL_SECS: u64 = 60;

/// Default derived-metrics logging interval (five minutes).
pub const DEFAULT_DERIVED_METRICS_INTERVAL_SECS: u64 = 300;

/// Default daily report interval (24 hours).
pub const DEFAULT_DAILY_REPORT_INTERVAL_SECS: u64 = 86_400;

/// Engine configuration.
///
/// This struct holds all configuration values for the telemetry engine.
/// Use [`Config::from_env`] to load configuration from environment variables.
///
/// The weekly report timer is not configurable: it is anchored to the next
/// Sunday boundary and then fires every seven days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory where generated reports are persisted.
    pub reports_dir: String,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: String,
    /// Interval between system-metrics snapshot log entries.
    pub system_metrics_interval_secs: u64,
    /// Interval between derived-metrics log entries.
    pub derived_metrics_interval_secs: u64,
    /// Interval between daily report generations.
    pub daily_report_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reports_dir: DEFAULT_REPORTS_DIR.into(),
            log_level: DEFAULT_LOG_LEVEL.into(),
            system_metrics_interval_secs: DEFAULT_SYSTEM_METRICS_INTERVAL_SECS,
            derived_metrics_interval_secs: DEFAULT_DERIVED_METRICS_INTERVAL_SECS,
            daily_report_interval_secs: DEFAULT_DAILY_REPORT_INTERVAL_SECS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional environment variables (with defaults):
    /// - `REPORTS_DIR`: Report output directory (default: `./data/reports`)
    /// - `LOG_LEVEL`: Logging level (default: `info`)
    /// - `SYSTEM_METRICS_INTERVAL_SECS`: System snapshot cadence (default: `60`)
    /// - `DERIVED_METRICS_INTERVAL_SECS`: Derived metrics cadence (default: `300`)
    /// - `DAILY_REPORT_INTERVAL_SECS`: Daily report cadence (default: `86400`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - Any interval is not a valid positive integer
    /// - Any value fails validation (see [`validate_config`])
    #[must_use = "configuration should be used"]
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let reports_dir =
            std::env::var("REPORTS_DIR").unwrap_or_else(|_| DEFAULT_REPORTS_DIR.into());

        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into());

        let system_metrics_interval_secs = parse_env_u64(
            "SYSTEM_METRICS_INTERVAL_SECS",
            DEFAULT_SYSTEM_METRICS_INTERVAL_SECS,
        )?;
        let derived_metrics_interval_secs = parse_env_u64(
            "DERIVED_METRICS_INTERVAL_SECS",
            DEFAULT_DERIVED_METRICS_INTERVAL_SECS,
        )?;
        let daily_report_interval_secs = parse_env_u64(
            "DAILY_REPORT_INTERVAL_SECS",
            DEFAULT_DAILY_REPORT_INTERVAL_SECS,
        )?;

        let config = Self {
            reports_dir,
            log_level,
            system_metrics_interval_secs,
            derived_metrics_interval_secs,
            daily_report_interval_secs,
        };

        validate_config(&config)?;
        Ok(config)
    }
}

/// Parse an environment variable as u64, using a default if not set.
fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    std::env::var(name).map_or(Ok(default), |val| {
        val.parse().map_err(|_| ConfigError::InvalidValue {
            var: name.into(),
            reason: "must be a positive integer".into(),
        })
    })
}
