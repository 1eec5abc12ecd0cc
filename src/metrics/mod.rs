//! Metrics collection.
//!
//! This module provides:
//! - The live aggregate store for three event domains (assistant turns,
//!   disease diagnoses, irrigation predictions) plus process-wide counters
//! - Record operations that validate and fold observations into the store
//! - Derived ratios computed on demand, never cached
//! - JSON and Prometheus exposition of the current snapshot
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use plant_telemetry::metrics::MetricsEngine;
//! use plant_telemetry::traits::RealTimeProvider;
//!
//! let engine = MetricsEngine::new(Arc::new(RealTimeProvider));
//! engine.record_api_call();
//! engine.record_api_call();
//!
//! let snapshot = engine.snapshot();
//! assert_eq!(snapshot.system.api_call_count, 2);
//! ```

mod derived;
mod engine;
mod export;
mod observations;
mod store;

pub use derived::DerivedMetrics;
pub use engine::MetricsEngine;
pub use export::MetricsFormat;
pub use observations::{
    DetectedDisease, DiagnosisFeedback, FeedbackFeature, IrrigationOutcome, IrrigationPrediction,
};
pub use store::{
    AssistantMetrics, DiagnosisMetrics, IrrigationMetrics, MetricsSnapshot, MetricsStore,
    SystemCounters, SystemSnapshot,
};
