//! Live aggregate state.
//!
//! [`MetricsStore`] holds the mutable running aggregates for the three event
//! domains plus process-wide counters. Averages and rates are never stored
//! here; they are derived on demand (see
//! [`DerivedMetrics`](super::DerivedMetrics)) so stored and computed values
//! cannot drift apart.
//!
//! The rating, confidence, and feedback sequences grow without bound; there is
//! no eviction policy. Long-running deployments that need bounded memory
//! should reset or window externally.

// Allow intentional numeric casts for metrics calculations
#![allow(clippy::cast_precision_loss)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::derived::DerivedMetrics;
use super::observations::DiagnosisFeedback;

/// Aggregates for the conversational assistant.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AssistantMetrics {
    /// Total assistant turns recorded.
    pub total_requests: u64,
    /// Sum of response times in milliseconds.
    pub total_response_time_ms: u64,
    /// User satisfaction ratings on the 1-5 scale, in arrival order.
    pub satisfaction_ratings: Vec<u8>,
    /// Turns judged on-topic.
    pub on_topic_count: u64,
    /// Turns judged off-topic.
    pub off_topic_count: u64,
    /// Turns answered by the fallback path.
    pub fallback_count: u64,
}

/// Aggregates for image-based disease diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiagnosisMetrics {
    /// Total analyses recorded.
    pub total_analyses: u64,
    /// Sum of processing times in milliseconds.
    pub total_processing_time_ms: u64,
    /// Model confidence per analysis, in arrival order.
    pub confidence_distribution: Vec<f64>,
    /// Detection count per disease name. Keys are discovered at runtime.
    pub disease_frequency: BTreeMap<String, u64>,
    /// 1/0 accuracy votes from user feedback, in arrival order.
    pub accuracy_ratings: Vec<u8>,
    /// Full user feedback records, in arrival order.
    pub feedback: Vec<DiagnosisFeedback>,
}

impl DiagnosisMetrics {
    /// Top diseases by detection count, capped at `limit` entries.
    ///
    /// Sorted by count descending; ties break by disease name ascending,
    /// which keeps the order deterministic.
    #[must_use]
    pub fn top_diseases(&self, limit: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self
            .disease_frequency
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        entries
    }
}

/// Aggregates for irrigation forecasting.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct IrrigationMetrics {
    /// Total predictions recorded.
    pub total_predictions: u64,
    /// Model confidence per prediction, in arrival order.
    pub prediction_confidence: Vec<f64>,
    /// Predictions the user adopted. The adoption rate is derived as
    /// `adopted_count / total_predictions`.
    pub adopted_count: u64,
    /// 1/0 accuracy votes from observed outcomes, in arrival order.
    pub accuracy_ratings: Vec<u8>,
    /// Estimated water saved by high-confidence no-water decisions, in
    /// milliliters. Monotonically non-decreasing.
    pub water_savings_ml: f64,
}

/// Process-wide counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SystemCounters {
    /// Engine start time. Immutable until a reset.
    pub started_at: DateTime<Utc>,
    /// Errors recorded (including rejected observations).
    pub error_count: u64,
    /// API calls observed by the middleware.
    pub api_call_count: u64,
    /// Broker messages observed.
    pub message_count: u64,
}

impl SystemCounters {
    /// Create zeroed counters with the given start time.
    #[must_use]
    pub const fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            error_count: 0,
            api_call_count: 0,
            message_count: 0,
        }
    }
}

/// The full mutable aggregate state.
///
/// All four sub-stores are siblings; there are no cross-references between
/// them. Mutation goes through [`MetricsEngine`](super::MetricsEngine), which
/// guards the store with a lock so every logical update is atomic with
/// respect to concurrent callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsStore {
    /// Conversational assistant aggregates.
    pub assistant: AssistantMetrics,
    /// Disease diagnosis aggregates.
    pub diagnosis: DiagnosisMetrics,
    /// Irrigation forecasting aggregates.
    pub irrigation: IrrigationMetrics,
    /// Process-wide counters.
    pub system: SystemCounters,
}

impl MetricsStore {
    /// Create a zero-state store with the given start time.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            assistant: AssistantMetrics::default(),
            diagnosis: DiagnosisMetrics::default(),
            irrigation: IrrigationMetrics::default(),
            system: SystemCounters::new(started_at),
        }
    }

    /// Replace all state with fresh zero-state anchored at `started_at`.
    pub fn reset(&mut self, started_at: DateTime<Utc>) {
        *self = Self::new(started_at);
    }

    /// Hours elapsed since the engine started.
    #[must_use]
    pub fn uptime_hours(&self, now: DateTime<Utc>) -> f64 {
        let millis = (now - self.system.started_at).num_milliseconds();
        millis.max(0) as f64 / (1000.0 * 60.0 * 60.0)
    }
}

/// Process-wide counters plus uptime, as exposed in snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemSnapshot {
    /// Engine start time.
    pub started_at: DateTime<Utc>,
    /// Hours elapsed since start.
    pub uptime_hours: f64,
    /// Errors recorded.
    pub error_count: u64,
    /// API calls observed.
    pub api_call_count: u64,
    /// Broker messages observed.
    pub message_count: u64,
}

/// A point-in-time view of the store plus derived metrics.
///
/// This is the JSON-serializable document returned to external consumers; it
/// is a clone, so holding one never blocks recording.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Conversational assistant aggregates.
    pub assistant: AssistantMetrics,
    /// Disease diagnosis aggregates.
    pub diagnosis: DiagnosisMetrics,
    /// Irrigation forecasting aggregates.
    pub irrigation: IrrigationMetrics,
    /// Process-wide counters plus uptime.
    pub system: SystemSnapshot,
    /// Ratios computed from the aggregates above.
    pub derived: DerivedMetrics,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_new_store_is_zero_state() {
        let store = MetricsStore::new(start());
        assert_eq!(store.assistant, AssistantMetrics::default());
        assert_eq!(store.diagnosis, DiagnosisMetrics::default());
        assert_eq!(store.irrigation, IrrigationMetrics::default());
        assert_eq!(store.system.started_at, start());
        assert_eq!(store.system.error_count, 0);
        assert_eq!(store.system.api_call_count, 0);
        assert_eq!(store.system.message_count, 0);
    }

    #[test]
    fn test_reset_discards_history() {
        let mut store = MetricsStore::new(start());
        store.assistant.total_requests = 42;
        store.diagnosis.disease_frequency.insert("rust".into(), 3);
        store.system.error_count = 7;

        let new_start = start() + chrono::Duration::hours(5);
        store.reset(new_start);

        assert_eq!(store, MetricsStore::new(new_start));
    }

    #[test]
    fn test_uptime_hours() {
        let store = MetricsStore::new(start());
        let now = start() + chrono::Duration::minutes(90);
        assert!((store.uptime_hours(now) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_uptime_hours_clock_skew_clamps_to_zero() {
        let store = MetricsStore::new(start());
        let now = start() - chrono::Duration::minutes(1);
        assert_eq!(store.uptime_hours(now), 0.0);
    }

    #[test]
    fn test_top_diseases_order_and_cap() {
        let mut store = MetricsStore::new(start());
        for (name, count) in [("a", 5), ("b", 5), ("c", 3), ("d", 1), ("e", 1), ("f", 1)] {
            store.diagnosis.disease_frequency.insert(name.into(), count);
        }

        let top = store.diagnosis.top_diseases(5);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0], ("a".to_string(), 5));
        assert_eq!(top[1], ("b".to_string(), 5));
        assert_eq!(top[2], ("c".to_string(), 3));
        // Tie at count 1 breaks by name: d, then e; f is cut by the cap.
        assert_eq!(top[3], ("d".to_string(), 1));
        assert_eq!(top[4], ("e".to_string(), 1));
    }

    #[test]
    fn test_top_diseases_empty() {
        let store = MetricsStore::new(start());
        assert!(store.diagnosis.top_diseases(5).is_empty());
    }

    #[test]
    fn test_store_serde_round_trip() {
        let mut store = MetricsStore::new(start());
        store.assistant.satisfaction_ratings.push(4);
        store.diagnosis.confidence_distribution.push(0.85);
        store.irrigation.water_savings_ml = 500.0;

        let json = serde_json::to_string(&store).unwrap();
        let parsed: MetricsStore = serde_json::from_str(&json).unwrap();
        assert_eq!(store, parsed);
    }
}
