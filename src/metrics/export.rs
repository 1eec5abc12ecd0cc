//! Metrics exposition.
//!
//! Renders a [`MetricsSnapshot`] for external monitoring systems, either as
//! pretty-printed JSON or in the Prometheus text exposition format. Each
//! Prometheus family carries its `# HELP` and `# TYPE` lines followed by the
//! sample.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::store::MetricsSnapshot;

/// Output format for metrics exposition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetricsFormat {
    /// Pretty-printed JSON of the full snapshot.
    Json,
    /// Prometheus text exposition format.
    Prometheus,
}

/// Render a snapshot in the requested format.
#[must_use]
pub fn render(snapshot: &MetricsSnapshot, format: MetricsFormat) -> String {
    match format {
        MetricsFormat::Json => serde_json::to_string_pretty(snapshot).unwrap_or_else(|err| {
            tracing::error!(error = %err, "Failed to serialize metrics snapshot");
            String::from("{}")
        }),
        MetricsFormat::Prometheus => render_prometheus(snapshot),
    }
}

/// Render the Prometheus text exposition.
fn render_prometheus(snapshot: &MetricsSnapshot) -> String {
    let mut out = String::new();
    push_family(
        &mut out,
        "assistant_requests_total",
        "Total number of assistant turns",
        "counter",
        &format_count(snapshot.assistant.total_requests),
    );
    push_family(
        &mut out,
        "assistant_avg_response_time_ms",
        "Average assistant response time in milliseconds",
        "gauge",
        &format_gauge(snapshot.derived.average_response_time_ms),
    );
    push_family(
        &mut out,
        "diagnosis_analyses_total",
        "Total number of disease analyses",
        "counter",
        &format_count(snapshot.diagnosis.total_analyses),
    );
    push_family(
        &mut out,
        "api_calls_total",
        "Total number of observed API calls",
        "counter",
        &format_count(snapshot.system.api_call_count),
    );
    out
}

/// Append one metric family: HELP line, TYPE line, sample, blank separator.
fn push_family(out: &mut String, name: &str, help: &str, kind: &str, value: &str) {
    // Write into a String cannot fail.
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {kind}");
    let _ = writeln!(out, "{name} {value}");
    out.push('\n');
}

fn format_count(value: u64) -> String {
    value.to_string()
}

fn format_gauge(value: f64) -> String {
    value.to_string()
}
