//! Derived metrics.
//!
//! Pure functions over a [`MetricsStore`] snapshot. Nothing here is cached or
//! persisted; every value is recomputed from the authoritative counters on
//! each call. Every ratio returns 0 (never NaN, never an error) on empty
//! input.

// Allow intentional numeric casts for metrics calculations
#![allow(clippy::cast_precision_loss)]

use serde::{Deserialize, Serialize};

use super::store::MetricsStore;

/// Ratios and averages computed on demand from the aggregate store.
///
/// `satisfaction_rate` is the mean of the 1-5 user ratings rescaled to
/// `0..=1` (a mean rating of 5 maps to 1.0).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DerivedMetrics {
    /// Mean satisfaction rating rescaled from the 1-5 scale to `0..=1`.
    pub satisfaction_rate: f64,
    /// Share of diagnosis feedback votes judging the result accurate.
    pub diagnosis_accuracy: f64,
    /// Share of irrigation predictions that matched the observed outcome.
    pub irrigation_accuracy: f64,
    /// Share of assistant turns that stayed on topic.
    pub topic_coverage_rate: f64,
    /// Share of assistant turns answered by the fallback path.
    pub fallback_rate: f64,
    /// Errors per observed API call.
    pub error_rate: f64,
    /// Mean assistant response time in milliseconds.
    pub average_response_time_ms: f64,
    /// Mean diagnosis processing time in milliseconds.
    pub average_processing_time_ms: f64,
    /// Mean diagnosis confidence.
    pub mean_confidence: f64,
    /// Share of predictions the user adopted.
    pub adoption_rate: f64,
}

impl DerivedMetrics {
    /// Compute every derived metric from the given store.
    #[must_use]
    pub fn compute(store: &MetricsStore) -> Self {
        Self {
            satisfaction_rate: satisfaction_rate(&store.assistant.satisfaction_ratings),
            diagnosis_accuracy: mean_u8(&store.diagnosis.accuracy_ratings),
            irrigation_accuracy: mean_u8(&store.irrigation.accuracy_ratings),
            topic_coverage_rate: ratio(
                store.assistant.on_topic_count,
                store.assistant.on_topic_count + store.assistant.off_topic_count,
            ),
            fallback_rate: ratio(store.assistant.fallback_count, store.assistant.total_requests),
            error_rate: ratio(store.system.error_count, store.system.api_call_count),
            average_response_time_ms: ratio(
                store.assistant.total_response_time_ms,
                store.assistant.total_requests,
            ),
            average_processing_time_ms: ratio(
                store.diagnosis.total_processing_time_ms,
                store.diagnosis.total_analyses,
            ),
            mean_confidence: mean_f64(&store.diagnosis.confidence_distribution),
            adoption_rate: ratio(
                store.irrigation.adopted_count,
                store.irrigation.total_predictions,
            ),
        }
    }
}

/// Mean of the 1-5 ratings rescaled to `0..=1`; 0 when empty.
fn satisfaction_rate(ratings: &[u8]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    mean_u8(ratings) / 5.0
}

/// Numerator over denominator with a denominator floor of 1.
fn ratio(numerator: u64, denominator: u64) -> f64 {
    numerator as f64 / denominator.max(1) as f64
}

/// Mean of a u8 sequence; 0 when empty.
fn mean_u8(values: &[u8]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| f64::from(*v)).sum::<f64>() / values.len() as f64
}

/// Mean of an f64 sequence; 0 when empty.
fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
