//! Periodic task driver.
//!
//! A single cooperative loop over four timers:
//! - every minute (configurable): snapshot and log system counters
//! - every five minutes (configurable): compute and log derived metrics
//! - every 24 hours (configurable): generate and persist the daily report
//! - weekly, anchored to the next Sunday boundary: generate and persist the
//!   weekly report
//!
//! Report generation runs on a spawned task so timers never block
//! observation recording. At most one report generation is in flight: a
//! report tick arriving while one is running is skipped, counted, and logged
//! as a warning rather than queued. The cheap log ticks run inline.
//!
//! Shutdown is graceful: [`SchedulerHandle::shutdown`] stops the loop and
//! awaits any in-flight report write before returning.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::analytics::Analytics;
use crate::config::Config;
use crate::metrics::MetricsEngine;
use crate::traits::TimeProvider;

/// Days in the weekly reporting period.
const WEEK_DAYS: u64 = 7;

/// Report cadences the scheduler drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportTick {
    Daily,
    Weekly,
}

impl ReportTick {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

/// Point-in-time scheduler counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SchedulerStats {
    /// System-metrics log ticks fired.
    pub system_ticks: u64,
    /// Derived-metrics log ticks fired.
    pub derived_ticks: u64,
    /// Daily reports generated successfully.
    pub daily_reports: u64,
    /// Weekly reports generated successfully.
    pub weekly_reports: u64,
    /// Report ticks dropped because a generation was already in flight.
    pub skipped_report_ticks: u64,
    /// Report generations that failed to persist.
    pub failed_report_ticks: u64,
}

/// Shared atomic counters behind the stats snapshot.
#[derive(Debug, Default)]
struct Counters {
    system_ticks: AtomicU64,
    derived_ticks: AtomicU64,
    daily_reports: AtomicU64,
    weekly_reports: AtomicU64,
    skipped_report_ticks: AtomicU64,
    failed_report_ticks: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SchedulerStats {
        SchedulerStats {
            system_ticks: self.system_ticks.load(Ordering::Relaxed),
            derived_ticks: self.derived_ticks.load(Ordering::Relaxed),
            daily_reports: self.daily_reports.load(Ordering::Relaxed),
            weekly_reports: self.weekly_reports.load(Ordering::Relaxed),
            skipped_report_ticks: self.skipped_report_ticks.load(Ordering::Relaxed),
            failed_report_ticks: self.failed_report_ticks.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a running scheduler.
///
/// Dropping the handle without calling [`SchedulerHandle::shutdown`] aborts
/// nothing; the loop keeps running until the process exits.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
    counters: Arc<Counters>,
}

impl SchedulerHandle {
    /// Current tick counters.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.counters.snapshot()
    }

    /// Stop the loop and wait for any in-flight report write to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(err) = self.join.await {
            tracing::error!(error = %err, "Scheduler task did not shut down cleanly");
        }
    }
}

/// The periodic driver.
///
/// Owns nothing mutable itself; it snapshots the engine and delegates report
/// work to [`Analytics`]. Start it with [`Scheduler::start`], which consumes
/// the scheduler and returns a handle.
pub struct Scheduler {
    engine: Arc<MetricsEngine>,
    analytics: Arc<Analytics>,
    clock: Arc<dyn TimeProvider>,
    system_interval: Duration,
    derived_interval: Duration,
    daily_interval: Duration,
}

impl Scheduler {
    /// Create a scheduler from the configuration's timer intervals.
    #[must_use]
    pub fn new(
        config: &Config,
        engine: Arc<MetricsEngine>,
        analytics: Arc<Analytics>,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            engine,
            analytics,
            clock,
            system_interval: Duration::from_secs(config.system_metrics_interval_secs),
            derived_interval: Duration::from_secs(config.derived_metrics_interval_secs),
            daily_interval: Duration::from_secs(config.daily_report_interval_secs),
        }
    }

    /// Spawn the timer loop and return its handle.
    #[must_use]
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let counters = Arc::new(Counters::default());
        let loop_counters = Arc::clone(&counters);
        let join = tokio::spawn(self.run(shutdown_rx, loop_counters));
        SchedulerHandle {
            shutdown_tx,
            join,
            counters,
        }
    }

    async fn run(self, mut shutdown_rx: watch::Receiver<bool>, counters: Arc<Counters>) {
        let mut system_interval = tokio::time::interval(self.system_interval);
        let mut derived_interval = tokio::time::interval(self.derived_interval);
        let mut daily_interval = tokio::time::interval(self.daily_interval);
        let weekly_start =
            tokio::time::Instant::now() + duration_until_next_sunday(self.clock.now());
        let mut weekly_interval = tokio::time::interval_at(
            weekly_start,
            Duration::from_secs(WEEK_DAYS * 24 * 60 * 60),
        );

        // A slow report write must not queue a burst of catch-up ticks.
        for interval in [
            &mut system_interval,
            &mut derived_interval,
            &mut daily_interval,
            &mut weekly_interval,
        ] {
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        }

        // Skip the immediate first tick of the unanchored timers.
        system_interval.tick().await;
        derived_interval.tick().await;
        daily_interval.tick().await;

        tracing::info!(
            system_interval_secs = self.system_interval.as_secs(),
            derived_interval_secs = self.derived_interval.as_secs(),
            daily_interval_secs = self.daily_interval.as_secs(),
            "Scheduler started"
        );

        let generating = Arc::new(AtomicBool::new(false));
        let mut in_flight: Option<JoinHandle<()>> = None;

        loop {
            tokio::select! {
                _ = system_interval.tick() => {
                    self.log_system_metrics();
                    counters.system_ticks.fetch_add(1, Ordering::Relaxed);
                }
                _ = derived_interval.tick() => {
                    self.log_derived_metrics();
                    counters.derived_ticks.fetch_add(1, Ordering::Relaxed);
                }
                _ = daily_interval.tick() => {
                    self.dispatch_report(ReportTick::Daily, &generating, &counters, &mut in_flight);
                }
                _ = weekly_interval.tick() => {
                    self.dispatch_report(ReportTick::Weekly, &generating, &counters, &mut in_flight);
                }
                result = shutdown_rx.changed() => {
                    if result.is_err() || *shutdown_rx.borrow() {
                        tracing::info!("Scheduler shutting down");
                        break;
                    }
                }
            }
        }

        // Let an in-flight report write finish; the sink's temp-then-rename
        // write keeps the directory clean even if the process dies anyway.
        if let Some(task) = in_flight.take() {
            if let Err(err) = task.await {
                tracing::error!(error = %err, "In-flight report task failed during shutdown");
            }
        }
    }

    /// Start a report generation unless one is already in flight.
    ///
    /// State machine per report tick: Idle -> Generating -> Idle. A tick
    /// that lands while Generating is dropped and counted.
    fn dispatch_report(
        &self,
        tick: ReportTick,
        generating: &Arc<AtomicBool>,
        counters: &Arc<Counters>,
        in_flight: &mut Option<JoinHandle<()>>,
    ) {
        if generating.swap(true, Ordering::AcqRel) {
            counters.skipped_report_ticks.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(report_type = tick.as_str(), "Report tick skipped: generation in flight");
            return;
        }

        let analytics = Arc::clone(&self.analytics);
        let counters = Arc::clone(counters);
        let generating = Arc::clone(generating);
        *in_flight = Some(tokio::spawn(async move {
            let result = match tick {
                ReportTick::Daily => analytics.generate_daily_report().await.map(|_| ()),
                ReportTick::Weekly => analytics.generate_weekly_report().await.map(|_| ()),
            };
            match result {
                Ok(()) => {
                    let counter = match tick {
                        ReportTick::Daily => &counters.daily_reports,
                        ReportTick::Weekly => &counters.weekly_reports,
                    };
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                Err(_) => {
                    // Already recorded through the engine by Analytics.
                    counters.failed_report_ticks.fetch_add(1, Ordering::Relaxed);
                }
            }
            generating.store(false, Ordering::Release);
        }));
    }

    /// Snapshot and log process-wide counters.
    fn log_system_metrics(&self) {
        let snapshot = self.engine.snapshot();
        tracing::info!(
            category = "system",
            uptime_hours = snapshot.system.uptime_hours,
            total_api_calls = snapshot.system.api_call_count,
            total_messages = snapshot.system.message_count,
            total_errors = snapshot.system.error_count,
            "System metrics update"
        );
    }

    /// Compute and log derived metrics.
    fn log_derived_metrics(&self) {
        let snapshot = self.engine.snapshot();
        tracing::info!(
            category = "system",
            satisfaction_rate = snapshot.derived.satisfaction_rate,
            diagnosis_accuracy = snapshot.derived.diagnosis_accuracy,
            irrigation_accuracy = snapshot.derived.irrigation_accuracy,
            water_savings_ml = snapshot.irrigation.water_savings_ml,
            "Derived metrics calculated"
        );
    }
}

/// Time until the next Sunday 00:00:00 UTC.
///
/// From a Sunday this is a full week, never zero, so the first weekly report
/// of a deployment is never generated at startup.
fn duration_until_next_sunday(now: DateTime<Utc>) -> Duration {
    use chrono::Datelike;

    let days_ahead = 7 - i64::from(now.weekday().num_days_from_sunday());
    let target = (now.date_naive() + chrono::Duration::days(days_ahead))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_else(|| now.naive_utc())
        .and_utc();
    (target - now).to_std().unwrap_or(Duration::ZERO)
}
