//! Telemetry daemon entry point.
//!
//! Builds the metrics engine and analytics service, starts the scheduler,
//! and runs until SIGINT. Shutdown is graceful: the scheduler finishes any
//! in-flight report write before the process exits.
//!
//! Coverage is excluded because the main function cannot be unit tested
//! as it requires signal delivery and a running scheduler loop.

// Enable the coverage attribute when running with nightly for llvm-cov exclusions
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use std::sync::Arc;

use plant_telemetry::analytics::{Analytics, FsReportSink};
use plant_telemetry::config::Config;
use plant_telemetry::metrics::MetricsEngine;
use plant_telemetry::scheduler::Scheduler;
use plant_telemetry::traits::{RealTimeProvider, TimeProvider};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() {
    // Structured JSON logs, level from the environment.
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "info".to_string())
                .parse()
                .unwrap_or_else(|_| tracing_subscriber::filter::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("plant-telemetry starting...");

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Configuration loaded: reports_dir={}, daily_interval={}s",
        config.reports_dir,
        config.daily_report_interval_secs
    );

    let clock: Arc<dyn TimeProvider> = Arc::new(RealTimeProvider);
    let engine = Arc::new(MetricsEngine::new(Arc::clone(&clock)));
    let sink = Arc::new(FsReportSink::new(&config.reports_dir));
    let analytics = Arc::new(Analytics::new(Arc::clone(&engine), sink));

    let handle = Scheduler::new(&config, engine, analytics, clock).start();

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    tracing::info!("Shutdown signal received");
    handle.shutdown().await;
    tracing::info!("plant-telemetry shutdown complete");
}
