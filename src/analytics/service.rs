//! The analytics service.
//!
//! Ties the metrics engine to report construction and persistence: scheduled
//! ticks call the generate methods, user-initiated calls export persisted
//! reports or assemble the realtime overview.
//!
//! Report generation is best-effort. A persistence failure is recorded
//! through the engine's error path and returned to the caller (the scheduler
//! marks the tick failed and keeps running); it never panics and never
//! blocks observation recording.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, PersistenceError};
use crate::metrics::MetricsEngine;
use crate::traits::ReportSink;

use super::builder::{build_daily_report, build_weekly_report};
use super::realtime::RealtimeOverview;
use super::report::{Report, ReportType};

/// Output format for report export.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Pretty-printed JSON array of reports.
    Json,
    /// One CSV row per report with a fixed column set.
    Csv,
}

/// CSV header row for exported reports.
const CSV_HEADERS: [&str; 9] = [
    "Date",
    "Chatbot Requests",
    "Disease Analyses",
    "Irrigation Predictions",
    "Chatbot Response Time",
    "Disease Processing Time",
    "Chatbot Satisfaction",
    "Disease Accuracy",
    "Irrigation Accuracy",
];

/// Report generation, export, and realtime analytics over one engine.
pub struct Analytics {
    engine: Arc<MetricsEngine>,
    sink: Arc<dyn ReportSink>,
}

impl Analytics {
    /// Create an analytics service over the given engine and report sink.
    #[must_use]
    pub fn new(engine: Arc<MetricsEngine>, sink: Arc<dyn ReportSink>) -> Self {
        Self { engine, sink }
    }

    /// Build and persist a daily report from the current aggregates.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the report cannot be written. The
    /// failure is already recorded through the engine before returning.
    pub async fn generate_daily_report(&self) -> Result<Report, PersistenceError> {
        let snapshot = self.engine.snapshot();
        let report = build_daily_report(&snapshot);
        self.persist(report, "daily_report_generation").await
    }

    /// Build and persist a weekly report from the current aggregates.
    ///
    /// Trend directions compare against the most recent persisted weekly
    /// report; the first weekly report of a deployment reports every
    /// direction as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the report cannot be written. The
    /// failure is already recorded through the engine before returning.
    pub async fn generate_weekly_report(&self) -> Result<Report, PersistenceError> {
        let previous = match self.sink.latest(ReportType::Weekly).await {
            Ok(previous) => previous,
            Err(err) => {
                // A missing directory just means no history yet.
                tracing::debug!(error = %err, "No previous weekly report available");
                None
            }
        };

        let snapshot = self.engine.snapshot();
        let report = build_weekly_report(&snapshot, previous.as_ref());
        self.persist(report, "weekly_report_generation").await
    }

    /// Export persisted reports generated within the inclusive date range.
    ///
    /// Malformed report files are skipped, each recorded as an error; they
    /// never abort the export.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if `start` is after `end` or the reports
    /// directory cannot be read.
    pub async fn export_reports(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        format: ReportFormat,
    ) -> Result<String, ExportError> {
        if start > end {
            return Err(ExportError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let (reports, skipped) = match self.sink.load_all().await {
            Ok(loaded) => loaded,
            Err(err) => {
                self.engine.record_error(&err, "analytics_export");
                let (path, message) = match err {
                    PersistenceError::DirectoryUnavailable { path, message }
                    | PersistenceError::ReadFailed { path, message } => (path, message),
                    other => (String::new(), other.to_string()),
                };
                return Err(ExportError::DirectoryUnreadable { path, message });
            }
        };
        for err in &skipped {
            self.engine.record_error(err, "analytics_export");
        }

        let selected: Vec<Report> = reports
            .into_iter()
            .filter(|report| {
                let date = report.generated_at.date_naive();
                date >= start && date <= end
            })
            .collect();

        match format {
            ReportFormat::Json => {
                Ok(serde_json::to_string_pretty(&selected).unwrap_or_else(|err| {
                    tracing::error!(error = %err, "Failed to serialize exported reports");
                    String::from("[]")
                }))
            }
            ReportFormat::Csv => Ok(reports_to_csv(&selected)),
        }
    }

    /// Assemble the on-demand realtime overview.
    #[must_use]
    pub fn realtime_overview(&self) -> RealtimeOverview {
        RealtimeOverview::from_snapshot(&self.engine.snapshot())
    }

    /// Persist a built report, logging success and recording failures.
    async fn persist(&self, report: Report, context: &str) -> Result<Report, PersistenceError> {
        match self.sink.persist(&report).await {
            Ok(file_name) => {
                tracing::info!(
                    category = "report",
                    report_type = report.report_type.as_str(),
                    file_name,
                    total_assistant_requests = report.summary.total_assistant_requests,
                    total_diagnosis_analyses = report.summary.total_diagnosis_analyses,
                    total_irrigation_predictions = report.summary.total_irrigation_predictions,
                    "Report generated"
                );
                Ok(report)
            }
            Err(err) => {
                self.engine.record_error(&err, context);
                Err(err)
            }
        }
    }
}

/// Flatten reports to CSV, one row per report.
///
/// Returns an empty string for an empty selection.
fn reports_to_csv(reports: &[Report]) -> String {
    if reports.is_empty() {
        return String::new();
    }

    let mut lines = vec![CSV_HEADERS.join(",")];
    for report in reports {
        let row = [
            report.generated_at.date_naive().to_string(),
            report.summary.total_assistant_requests.to_string(),
            report.summary.total_diagnosis_analyses.to_string(),
            report.summary.total_irrigation_predictions.to_string(),
            report.performance.assistant.average_response_time_ms.to_string(),
            report.performance.diagnosis.average_processing_time_ms.to_string(),
            report.performance.assistant.satisfaction_rate.to_string(),
            report.performance.diagnosis.accuracy.to_string(),
            report.performance.irrigation.accuracy.to_string(),
        ];
        lines.push(row.join(","));
    }
    lines.join("\n")
}
