//! Report generation, persistence, and export workflows.
//!
//! These tests run the full path producers and operators see: record traffic,
//! generate reports through the analytics service, then read them back
//! through the export API.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use plant_telemetry::analytics::{
    Analytics, FsReportSink, Report, ReportFormat, ReportType, TrendDirection,
};
use plant_telemetry::error::ExportError;
use plant_telemetry::metrics::MetricsEngine;
use plant_telemetry::traits::TimeProvider;
use pretty_assertions::assert_eq;

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
struct FixedClock(DateTime<Utc>);

impl TimeProvider for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 8, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Analytics service whose engine clock is pinned at `now`, sharing `dir`.
fn analytics_at(now: DateTime<Utc>, dir: &std::path::Path) -> (Arc<MetricsEngine>, Analytics) {
    let engine = Arc::new(MetricsEngine::new(Arc::new(FixedClock(now))));
    let sink = Arc::new(FsReportSink::new(dir));
    let analytics = Analytics::new(Arc::clone(&engine), sink);
    (engine, analytics)
}

#[tokio::test]
async fn daily_report_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, analytics) = analytics_at(at(2024, 1, 1), dir.path());

    let start = at(2024, 1, 1);
    engine
        .record_assistant_turn(start, start + Duration::milliseconds(900), true, false, Some(5))
        .unwrap();
    engine.record_api_call();

    let report = analytics.generate_daily_report().await.unwrap();
    assert_eq!(report.summary.total_assistant_requests, 1);

    let content =
        std::fs::read_to_string(dir.path().join("daily-report-2024-01-01.json")).unwrap();
    let parsed: Report = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, report);
}

#[tokio::test]
async fn export_range_selects_inclusive_dates() {
    let dir = tempfile::tempdir().unwrap();

    let (_, analytics_jan1) = analytics_at(at(2024, 1, 1), dir.path());
    analytics_jan1.generate_daily_report().await.unwrap();
    let (_, analytics_jan5) = analytics_at(at(2024, 1, 5), dir.path());
    analytics_jan5.generate_daily_report().await.unwrap();

    let json = analytics_jan5
        .export_reports(date(2024, 1, 1), date(2024, 1, 3), ReportFormat::Json)
        .await
        .unwrap();
    let exported: Vec<Report> = serde_json::from_str(&json).unwrap();

    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].generated_at.date_naive(), date(2024, 1, 1));
}

#[tokio::test]
async fn export_rejects_inverted_range() {
    let dir = tempfile::tempdir().unwrap();
    let (_, analytics) = analytics_at(at(2024, 1, 1), dir.path());

    let err = analytics
        .export_reports(date(2024, 2, 1), date(2024, 1, 1), ReportFormat::Json)
        .await
        .unwrap_err();
    assert!(matches!(err, ExportError::InvalidRange { .. }));
}

#[tokio::test]
async fn export_skips_malformed_report_files() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, analytics) = analytics_at(at(2024, 1, 1), dir.path());
    analytics.generate_daily_report().await.unwrap();
    std::fs::write(dir.path().join("daily-report-2024-01-02.json"), "garbage").unwrap();

    let json = analytics
        .export_reports(date(2024, 1, 1), date(2024, 1, 31), ReportFormat::Json)
        .await
        .unwrap();
    let exported: Vec<Report> = serde_json::from_str(&json).unwrap();

    assert_eq!(exported.len(), 1);
    assert_eq!(engine.snapshot().system.error_count, 1);
}

#[tokio::test]
async fn csv_export_flattens_reports() {
    let dir = tempfile::tempdir().unwrap();

    let (engine, analytics) = analytics_at(at(2024, 1, 1), dir.path());
    let start = at(2024, 1, 1);
    engine
        .record_assistant_turn(start, start + Duration::milliseconds(1000), true, false, Some(4))
        .unwrap();
    analytics.generate_daily_report().await.unwrap();
    let (_, analytics_jan2) = analytics_at(at(2024, 1, 2), dir.path());
    analytics_jan2.generate_daily_report().await.unwrap();

    let csv = analytics_jan2
        .export_reports(date(2024, 1, 1), date(2024, 1, 31), ReportFormat::Csv)
        .await
        .unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Date,Chatbot Requests,"));
    assert!(lines[1].starts_with("2024-01-01,1,"));
    assert!(lines[2].starts_with("2024-01-02,0,"));
}

#[tokio::test]
async fn weekly_reports_compute_real_trends_across_runs() {
    let dir = tempfile::tempdir().unwrap();

    // Week one: no traffic.
    let (_, analytics_w1) = analytics_at(at(2024, 1, 7), dir.path());
    let first = analytics_w1.generate_weekly_report().await.unwrap();
    assert_eq!(first.trends.unwrap().assistant_usage, TrendDirection::Unknown);

    // Week two: assistant traffic picks up.
    let (engine, analytics_w2) = analytics_at(at(2024, 1, 14), dir.path());
    let start = at(2024, 1, 14);
    for _ in 0..4 {
        engine
            .record_assistant_turn(start, start + Duration::milliseconds(400), true, false, None)
            .unwrap();
    }
    let second = analytics_w2.generate_weekly_report().await.unwrap();

    let trends = second.trends.unwrap();
    assert_eq!(trends.assistant_usage, TrendDirection::Increasing);
    assert_eq!(trends.diagnosis_usage, TrendDirection::Stable);
    assert_eq!(second.report_type, ReportType::Weekly);
}

#[tokio::test]
async fn weekly_report_carries_top_diseases_and_behavior() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, analytics) = analytics_at(at(2024, 1, 7), dir.path());
    let start = at(2024, 1, 7);

    for name in ["mildew", "mildew", "rust"] {
        engine
            .record_diagnosis(
                start,
                start + Duration::milliseconds(800),
                0.9,
                &[plant_telemetry::metrics::DetectedDisease::new(name)],
                None,
            )
            .unwrap();
    }

    let report = analytics.generate_weekly_report().await.unwrap();
    let top = report.top_diseases.unwrap();
    assert_eq!(top[0].disease, "mildew");
    assert_eq!(top[0].count, 2);
    assert_eq!(top[1].disease, "rust");

    let behavior = report.user_behavior.unwrap();
    assert!(behavior.feature_adoption.disease_detection);
    assert!(!behavior.feature_adoption.chatbot);
}
