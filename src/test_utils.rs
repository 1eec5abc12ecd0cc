//! Test utilities and fixtures.
//!
//! Shared helpers for unit tests: engines pinned to a fixed clock and
//! prebuilt report documents.
//!
//! Only compiled for tests (`#[cfg(test)]`).

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::analytics::{build_daily_report, build_weekly_report, Report};
use crate::metrics::MetricsEngine;
use crate::traits::MockTimeProvider;

/// The instant test engines are pinned to: 2024-03-15 12:00:00 UTC.
#[must_use]
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

/// A clock that always reports the given instant.
#[must_use]
pub fn clock_at(instant: DateTime<Utc>) -> Arc<MockTimeProvider> {
    let mut clock = MockTimeProvider::new();
    clock.expect_now().return_const(instant);
    Arc::new(clock)
}

/// An engine whose clock is pinned at the given instant.
#[must_use]
pub fn engine_at(instant: DateTime<Utc>) -> MetricsEngine {
    MetricsEngine::new(clock_at(instant))
}

/// A daily report built from an empty engine pinned at `generated_at`.
#[must_use]
pub fn daily_report_at(generated_at: DateTime<Utc>) -> Report {
    build_daily_report(&engine_at(generated_at).snapshot())
}

/// A daily report built from an empty engine at the fixed test time.
#[must_use]
pub fn empty_daily_report() -> Report {
    daily_report_at(fixed_time())
}

/// A weekly report built from an empty engine at the fixed test time.
#[must_use]
pub fn empty_weekly_report() -> Report {
    build_weekly_report(&engine_at(fixed_time()).snapshot(), None)
}
