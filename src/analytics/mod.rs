//! Analytics and reporting.
//!
//! This module provides:
//! - Immutable daily/weekly report documents with rule-based insights,
//!   recommendations, and week-over-week trends
//! - Filesystem persistence with atomic writes (temp file + rename)
//! - Report export over a date range as JSON or CSV
//! - An on-demand realtime overview with threshold alerts
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use plant_telemetry::analytics::{Analytics, FsReportSink};
//! use plant_telemetry::metrics::MetricsEngine;
//! use plant_telemetry::traits::RealTimeProvider;
//!
//! # async fn run() {
//! let engine = Arc::new(MetricsEngine::new(Arc::new(RealTimeProvider)));
//! let sink = Arc::new(FsReportSink::new("./data/reports"));
//! let analytics = Analytics::new(engine, sink);
//!
//! let report = analytics.generate_daily_report().await;
//! # let _ = report;
//! # }
//! ```

mod builder;
mod realtime;
mod report;
mod service;
mod store;

pub use builder::{
    build_daily_report, build_weekly_report, generate_insights, generate_recommendations,
};
pub use realtime::{Alert, CurrentLoad, RealtimeOverview, SystemHealthStatus};
pub use report::{
    AssistantPerformance, DiagnosisPerformance, DiseaseCount, FeatureAdoption,
    FeatureSatisfaction, Insight, IrrigationPerformance, Priority, Recommendation, Report,
    ReportPeriod, ReportPerformance, ReportSummary, ReportType, Severity, SystemHealth,
    TrendDirection, Trends, UserBehavior,
};
pub use service::{Analytics, ReportFormat};
pub use store::FsReportSink;
