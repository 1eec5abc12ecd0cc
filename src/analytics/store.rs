//! Filesystem report persistence.
//!
//! [`FsReportSink`] keeps one JSON file per report under a fixed reports
//! directory, named `{type}-report-{ISO date}.json`. Writes go to a
//! temporary file first and are renamed into place, so a crash mid-write
//! never leaves a partial report behind. Reports are never mutated or
//! deleted here; retention is an external concern.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::PersistenceError;
use crate::traits::ReportSink;

use super::report::{Report, ReportType};

/// Suffix appended to a report file while it is being written.
const TMP_SUFFIX: &str = ".tmp";

/// Report sink backed by a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FsReportSink {
    root: PathBuf,
}

impl FsReportSink {
    /// Create a sink rooted at the given directory.
    ///
    /// The directory is created on first write, not here, so construction
    /// never touches the disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory reports are stored under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn display_path(&self, path: &Path) -> String {
        path.display().to_string()
    }
}

#[async_trait]
impl ReportSink for FsReportSink {
    async fn persist(&self, report: &Report) -> Result<String, PersistenceError> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|err| {
            PersistenceError::DirectoryUnavailable {
                path: self.display_path(&self.root),
                message: err.to_string(),
            }
        })?;

        let file_name = report.file_name();
        let final_path = self.root.join(&file_name);
        let tmp_path = self.root.join(format!("{file_name}{TMP_SUFFIX}"));

        let json = serde_json::to_string_pretty(report).map_err(|err| {
            PersistenceError::WriteFailed {
                path: self.display_path(&final_path),
                message: err.to_string(),
            }
        })?;

        tokio::fs::write(&tmp_path, json).await.map_err(|err| {
            PersistenceError::WriteFailed {
                path: self.display_path(&tmp_path),
                message: err.to_string(),
            }
        })?;
        tokio::fs::rename(&tmp_path, &final_path).await.map_err(|err| {
            PersistenceError::WriteFailed {
                path: self.display_path(&final_path),
                message: err.to_string(),
            }
        })?;

        Ok(file_name)
    }

    async fn load_all(&self) -> Result<(Vec<Report>, Vec<PersistenceError>), PersistenceError> {
        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(|err| {
            PersistenceError::DirectoryUnavailable {
                path: self.display_path(&self.root),
                message: err.to_string(),
            }
        })?;

        let mut reports = Vec::new();
        let mut skipped = Vec::new();

        loop {
            let entry = match dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(err) => {
                    return Err(PersistenceError::DirectoryUnavailable {
                        path: self.display_path(&self.root),
                        message: err.to_string(),
                    })
                }
            };

            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.contains("report") || !name.ends_with(".json") {
                continue;
            }

            let path = entry.path();
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(err) => {
                    skipped.push(PersistenceError::ReadFailed {
                        path: self.display_path(&path),
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            match serde_json::from_str::<Report>(&content) {
                Ok(report) => reports.push(report),
                Err(err) => skipped.push(PersistenceError::MalformedReport {
                    path: self.display_path(&path),
                    message: err.to_string(),
                }),
            }
        }

        // Directory iteration order is platform-dependent.
        reports.sort_by_key(|report| report.generated_at);
        Ok((reports, skipped))
    }

    async fn latest(&self, report_type: ReportType) -> Result<Option<Report>, PersistenceError> {
        let (reports, _) = self.load_all().await?;
        Ok(reports
            .into_iter()
            .filter(|report| report.report_type == report_type)
            .max_by_key(|report| report.generated_at))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::{daily_report_at, empty_daily_report, empty_weekly_report};
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn test_persist_writes_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());

        let name = sink.persist(&empty_daily_report()).await.unwrap();
        assert_eq!(name, "daily-report-2024-03-15.json");
        assert!(dir.path().join(&name).exists());
    }

    #[tokio::test]
    async fn test_persist_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        sink.persist(&empty_daily_report()).await.unwrap();

        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            names.push(entry.unwrap().file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["daily-report-2024-03-15.json"]);
    }

    #[tokio::test]
    async fn test_persist_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("reports");
        let sink = FsReportSink::new(&nested);

        sink.persist(&empty_daily_report()).await.unwrap();
        assert!(nested.join("daily-report-2024-03-15.json").exists());
    }

    #[tokio::test]
    async fn test_load_all_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        let daily = empty_daily_report();
        let weekly = empty_weekly_report();

        sink.persist(&daily).await.unwrap();
        sink.persist(&weekly).await.unwrap();

        let (reports, skipped) = sink.load_all().await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(skipped.is_empty());
        assert!(reports.contains(&daily));
        assert!(reports.contains(&weekly));
    }

    #[tokio::test]
    async fn test_load_all_skips_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        sink.persist(&empty_daily_report()).await.unwrap();
        std::fs::write(dir.path().join("daily-report-2024-03-16.json"), "{not json")
            .unwrap();

        let (reports, skipped) = sink.load_all().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert!(matches!(
            skipped[0],
            PersistenceError::MalformedReport { .. }
        ));
    }

    #[tokio::test]
    async fn test_load_all_ignores_unrelated_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        sink.persist(&empty_daily_report()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.path().join("other.json"), "{}").unwrap();

        let (reports, skipped) = sink.load_all().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert!(skipped.is_empty());
    }

    #[tokio::test]
    async fn test_load_all_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path().join("missing"));

        let result = sink.load_all().await;
        assert!(matches!(
            result,
            Err(PersistenceError::DirectoryUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_all_sorted_by_generated_at() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();

        // Persist out of order; load_all returns them sorted.
        sink.persist(&daily_report_at(t0 + Duration::days(2))).await.unwrap();
        sink.persist(&daily_report_at(t0)).await.unwrap();
        sink.persist(&daily_report_at(t0 + Duration::days(1))).await.unwrap();

        let (reports, _) = sink.load_all().await.unwrap();
        let dates: Vec<_> = reports.iter().map(|r| r.generated_at).collect();
        assert_eq!(
            dates,
            vec![t0, t0 + Duration::days(1), t0 + Duration::days(2)]
        );
    }

    #[tokio::test]
    async fn test_latest_filters_by_type() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        let t0 = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();

        sink.persist(&daily_report_at(t0)).await.unwrap();
        sink.persist(&daily_report_at(t0 + Duration::days(3))).await.unwrap();
        sink.persist(&empty_weekly_report()).await.unwrap();

        let latest_daily = sink.latest(ReportType::Daily).await.unwrap().unwrap();
        assert_eq!(latest_daily.generated_at, t0 + Duration::days(3));

        let latest_weekly = sink.latest(ReportType::Weekly).await.unwrap().unwrap();
        assert_eq!(latest_weekly.report_type, ReportType::Weekly);
    }

    #[tokio::test]
    async fn test_latest_none_without_reports() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsReportSink::new(dir.path());
        sink.persist(&empty_daily_report()).await.unwrap();

        let latest = sink.latest(ReportType::Weekly).await.unwrap();
        assert!(latest.is_none());
    }
}
