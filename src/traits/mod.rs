//! Trait definitions for mockable dependencies.
//!
//! This module defines traits for:
//! - [`TimeProvider`]: Time abstraction for deterministic testing
//! - [`ReportSink`]: Report persistence abstraction
//!
//! # Mocking
//!
//! All traits are annotated with `#[cfg_attr(test, mockall::automock)]`
//! which generates mock implementations automatically for testing.
//!
//! # Example
//!
//! ```
//! use plant_telemetry::traits::{TimeProvider, RealTimeProvider};
//!
//! let time_provider = RealTimeProvider;
//! let now = time_provider.now();
//! println!("Current time: {now}");
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::analytics::{Report, ReportType};
use crate::error::PersistenceError;

/// Time provider trait for deterministic testing.
///
/// This trait abstracts time operations to allow for
/// deterministic testing by providing fixed timestamps.
#[cfg_attr(test, mockall::automock)]
pub trait TimeProvider: Send + Sync {
    /// Get the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Real time provider using system clock.
///
/// This is the production implementation that returns the actual current time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealTimeProvider;

impl TimeProvider for RealTimeProvider {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Report persistence trait for mocking.
///
/// This trait abstracts report storage to allow for dependency injection and
/// testing with mock implementations. The production implementation is
/// [`FsReportSink`](crate::analytics::FsReportSink), which writes one JSON
/// file per report under a fixed reports directory.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Persist a report, returning the name it was stored under.
    ///
    /// Implementations must be atomic: a failed persist leaves no partial
    /// artifact behind.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the report cannot be written.
    async fn persist(&self, report: &Report) -> Result<String, PersistenceError>;

    /// Load every parseable persisted report.
    ///
    /// Malformed files are skipped and returned alongside the parsed reports
    /// so the caller can record them without aborting the scan.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the reports directory cannot be read.
    async fn load_all(&self) -> Result<(Vec<Report>, Vec<PersistenceError>), PersistenceError>;

    /// Load the most recently generated report of the given type.
    ///
    /// Returns `None` if no report of that type has been persisted.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the reports directory cannot be read.
    async fn latest(&self, report_type: ReportType) -> Result<Option<Report>, PersistenceError>;
}
