//! Error types for the telemetry engine.
//!
//! This module defines a hierarchical error system:
//! - [`TelemetryError`]: Top-level engine errors
//! - [`ObservationError`]: Malformed input to a record operation
//! - [`PersistenceError`]: Report write/read failures
//! - [`ExportError`]: Report export failures
//! - [`ConfigError`]: Configuration errors
//!
//! All errors implement `Send + Sync` for async compatibility.
//!
//! Record operations are fail-safe, not fail-fast: a rejected observation
//! increments the engine's error counter and is logged, but never panics and
//! never corrupts aggregates. Scheduled report generation swallows
//! [`PersistenceError`] (the tick is marked failed and the scheduler keeps
//! running); [`ExportError`] surfaces to the caller because export is a
//! synchronous, user-initiated operation.

use thiserror::Error;

/// Top-level engine error.
///
/// This is the main error type returned by public API functions.
/// It wraps all subsystem errors for unified error handling.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Malformed observation.
    #[error("Invalid observation: {0}")]
    Observation(#[from] ObservationError),

    /// Report persistence error.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Report export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Malformed input to a record operation.
///
/// The engine validates every observation before touching any aggregate, so a
/// rejected observation leaves the store exactly as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ObservationError {
    /// The completion timestamp precedes the start timestamp.
    #[error("Negative duration: completed {completed_at} before started {started_at}")]
    NegativeDuration {
        /// Observation start, Unix epoch milliseconds.
        started_at: i64,
        /// Observation completion, Unix epoch milliseconds.
        completed_at: i64,
    },

    /// Confidence outside the closed interval `[0.0, 1.0]`.
    #[error("Confidence {value} outside [0.0, 1.0]")]
    ConfidenceOutOfRange {
        /// The rejected confidence value.
        value: f64,
    },

    /// Rating outside the 1-5 scale.
    #[error("Rating {value} outside 1-5")]
    RatingOutOfRange {
        /// The rejected rating value.
        value: u8,
    },

    /// Water amount that is negative or not a finite number.
    #[error("Water amount {value} is not a non-negative finite number")]
    AmountOutOfRange {
        /// The rejected amount in milliliters.
        value: f64,
    },

    /// Adoption feedback arrived before any prediction was recorded.
    #[error("Adoption feedback without a recorded prediction")]
    FeedbackWithoutPrediction,
}

/// Report persistence errors.
///
/// These errors represent failures writing or reading report files.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The reports directory could not be created or opened.
    #[error("Reports directory unavailable: {path} - {message}")]
    DirectoryUnavailable {
        /// The directory path.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// A report file could not be written.
    #[error("Report write failed: {path} - {message}")]
    WriteFailed {
        /// The file path.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// A report file could not be read.
    #[error("Report read failed: {path} - {message}")]
    ReadFailed {
        /// The file path.
        path: String,
        /// Description of the failure.
        message: String,
    },

    /// A report file exists but does not parse as a report.
    #[error("Malformed report file: {path} - {message}")]
    MalformedReport {
        /// The file path.
        path: String,
        /// Description of the parse failure.
        message: String,
    },
}

/// Report export errors.
///
/// These surface to the caller: export is synchronous and user-initiated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The requested date range is inverted.
    #[error("Invalid export range: {start} is after {end}")]
    InvalidRange {
        /// Range start (ISO date).
        start: String,
        /// Range end (ISO date).
        end: String,
    },

    /// The reports directory could not be scanned.
    #[error("Reports directory unreadable: {path} - {message}")]
    DirectoryUnreadable {
        /// The directory path.
        path: String,
        /// Description of the failure.
        message: String,
    },
}

/// Configuration errors.
///
/// These errors represent failures in configuration loading and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
