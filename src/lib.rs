//! Plant Telemetry Engine
//!
//! An in-process monitoring and analytics engine for an AI plant-care
//! service. Producers (chat handler, disease-detection handler, irrigation
//! handler, API middleware) record observations synchronously; the engine
//! maintains running aggregates, derives quality ratios on demand, and
//! periodically materializes daily/weekly reports with rule-based insights.
//!
//! # Features
//!
//! - Running aggregates for three event domains plus process-wide counters
//! - Derived metrics (satisfaction, accuracy, coverage, error rates) computed
//!   on demand, never stored
//! - Daily/weekly JSON reports with insights, recommendations, and trends
//! - Prometheus text exposition for external scrapers
//! - Cooperative four-timer scheduler with graceful shutdown
//!
//! # Quick Start
//!
//! ```bash
//! REPORTS_DIR=./data/reports ./plant-telemetry
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  record_*   ┌───────────────┐  snapshot  ┌───────────┐
//! │ producers  │────────────▶│ MetricsEngine │───────────▶│ Analytics │
//! │ (handlers) │             │  (aggregates) │            │ (reports) │
//! └────────────┘             └───────┬───────┘            └─────┬─────┘
//!                                    │ ticks                    │ JSON
//!                                    ▼                          ▼
//!                                Scheduler                 reports dir
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod config;
pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod traits;

#[cfg(test)]
mod test_utils;
