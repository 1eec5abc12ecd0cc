//! The metrics engine.
//!
//! [`MetricsEngine`] owns the aggregate store behind a lock and exposes the
//! record operations producers call on every event. Each logical update is a
//! short critical section, so multi-field updates are atomic with respect to
//! concurrent callers and readers never observe partial state.
//!
//! Record operations are fail-safe: malformed input increments the error
//! counter, emits a structured log event, and returns a typed error without
//! touching any other aggregate. Callers on user-serving paths are free to
//! ignore the result.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::error::ObservationError;
use crate::traits::TimeProvider;

use super::derived::DerivedMetrics;
use super::export::{self, MetricsFormat};
use super::observations::{
    duration_ms, validate_confidence, validate_rating, DetectedDisease, DiagnosisFeedback,
    FeedbackFeature, IrrigationOutcome, IrrigationPrediction, POSITIVE_RATING_THRESHOLD,
};
use super::store::{MetricsSnapshot, MetricsStore, SystemSnapshot};

/// Water credited for a high-confidence no-water decision when the
/// prediction carries no explicit amount, in milliliters.
const DEFAULT_WATER_SAVINGS_ML: f64 = 500.0;

/// Confidence above which a no-water decision counts toward water savings.
const WATER_SAVINGS_CONFIDENCE: f64 = 0.7;

/// Thread-safe metrics engine.
///
/// Construct one per process with [`MetricsEngine::new`]; the caller owns the
/// instance and controls the scheduler lifecycle separately (see
/// [`Scheduler`](crate::scheduler::Scheduler)). The clock is injectable for
/// deterministic tests.
pub struct MetricsEngine {
    store: RwLock<MetricsStore>,
    clock: Arc<dyn TimeProvider>,
}

impl MetricsEngine {
    /// Create an engine with zeroed aggregates anchored at the clock's
    /// current time.
    #[must_use]
    pub fn new(clock: Arc<dyn TimeProvider>) -> Self {
        let started_at = clock.now();
        Self {
            store: RwLock::new(MetricsStore::new(started_at)),
            clock,
        }
    }

    /// Record one assistant turn.
    ///
    /// The response time is `completed_at - started_at`. The turn counts
    /// toward the on-topic or off-topic bucket, the fallback counter when
    /// `used_fallback`, and the satisfaction sequence when a rating is
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] for a negative duration or a satisfaction
    /// rating outside 1-5. On rejection the error counter is incremented and
    /// no other state changes.
    pub fn record_assistant_turn(
        &self,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        on_topic: bool,
        used_fallback: bool,
        satisfaction: Option<u8>,
    ) -> Result<(), ObservationError> {
        let response_time_ms = match duration_ms(started_at, completed_at) {
            Ok(ms) => ms,
            Err(err) => return Err(self.reject(err)),
        };
        if let Some(rating) = satisfaction {
            if let Err(err) = validate_rating(rating) {
                return Err(self.reject(err));
            }
        }

        self.with_store_mut(|store| {
            store.assistant.total_requests += 1;
            store.assistant.total_response_time_ms += response_time_ms;
            if on_topic {
                store.assistant.on_topic_count += 1;
            } else {
                store.assistant.off_topic_count += 1;
            }
            if used_fallback {
                store.assistant.fallback_count += 1;
            }
            if let Some(rating) = satisfaction {
                store.assistant.satisfaction_ratings.push(rating);
            }
        });

        tracing::info!(
            category = "user_interaction",
            feature = "chatbot",
            response_time_ms,
            on_topic,
            used_fallback,
            satisfaction,
            "User interaction tracked"
        );
        Ok(())
    }

    /// Record one disease diagnosis.
    ///
    /// Appends the model confidence, bumps the per-disease frequency for each
    /// detection (creating keys on first sight), and folds in user feedback
    /// when present: the record is appended, and an `is_accurate` verdict
    /// adds a 1/0 accuracy vote.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] for a negative duration, a confidence
    /// outside `[0.0, 1.0]`, or a feedback rating outside 1-5. On rejection
    /// the error counter is incremented and no other state changes.
    pub fn record_diagnosis(
        &self,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        confidence: f64,
        detected_diseases: &[DetectedDisease],
        feedback: Option<DiagnosisFeedback>,
    ) -> Result<(), ObservationError> {
        let processing_time_ms = match duration_ms(started_at, completed_at) {
            Ok(ms) => ms,
            Err(err) => return Err(self.reject(err)),
        };
        if let Err(err) = validate_confidence(confidence) {
            return Err(self.reject(err));
        }
        if let Some(rating) = feedback.as_ref().and_then(|f| f.rating) {
            if let Err(err) = validate_rating(rating) {
                return Err(self.reject(err));
            }
        }

        let disease_count = detected_diseases.len();
        self.with_store_mut(|store| {
            store.diagnosis.total_analyses += 1;
            store.diagnosis.total_processing_time_ms += processing_time_ms;
            store.diagnosis.confidence_distribution.push(confidence);
            for disease in detected_diseases {
                *store
                    .diagnosis
                    .disease_frequency
                    .entry(disease.name.clone())
                    .or_insert(0) += 1;
            }
            if let Some(feedback) = feedback {
                if let Some(is_accurate) = feedback.is_accurate {
                    store
                        .diagnosis
                        .accuracy_ratings
                        .push(u8::from(is_accurate));
                }
                store.diagnosis.feedback.push(feedback);
            }
        });

        tracing::info!(
            category = "ai_inference",
            model = "disease_detection",
            processing_time_ms,
            confidence,
            disease_count,
            "AI inference completed"
        );
        Ok(())
    }

    /// Record one irrigation prediction.
    ///
    /// Appends the model confidence. When `user_adopted` is present it counts
    /// toward the adoption rate (derived as adopted over total predictions).
    /// When an outcome is present and the model committed to a decision, a
    /// 1/0 accuracy vote records whether they matched. A no-water decision
    /// with confidence above 0.7 credits the recommended amount (default
    /// 500 ml) to the water-savings accumulator.
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] for a confidence outside `[0.0, 1.0]` or
    /// a negative/non-finite water amount. On rejection the error counter is
    /// incremented and no other state changes.
    pub fn record_irrigation_prediction(
        &self,
        confidence: f64,
        prediction: &IrrigationPrediction,
        user_adopted: Option<bool>,
        actual_outcome: Option<IrrigationOutcome>,
    ) -> Result<(), ObservationError> {
        if let Err(err) = validate_confidence(confidence) {
            return Err(self.reject(err));
        }
        if let Some(amount) = prediction.water_amount_ml {
            if !amount.is_finite() || amount < 0.0 {
                return Err(self.reject(ObservationError::AmountOutOfRange { value: amount }));
            }
        }

        let accuracy_vote = match (actual_outcome, prediction.should_water) {
            (Some(outcome), Some(should_water)) => {
                Some(u8::from(should_water == outcome.was_needed))
            }
            _ => None,
        };
        let savings = (prediction.should_water == Some(false)
            && confidence > WATER_SAVINGS_CONFIDENCE)
            .then(|| prediction.water_amount_ml.unwrap_or(DEFAULT_WATER_SAVINGS_ML));

        self.with_store_mut(|store| {
            store.irrigation.total_predictions += 1;
            store.irrigation.prediction_confidence.push(confidence);
            if user_adopted == Some(true) {
                store.irrigation.adopted_count += 1;
            }
            if let Some(vote) = accuracy_vote {
                store.irrigation.accuracy_ratings.push(vote);
            }
            if let Some(amount) = savings {
                store.irrigation.water_savings_ml += amount;
            }
        });

        tracing::info!(
            category = "ai_inference",
            model = "irrigation_prediction",
            confidence,
            should_water = prediction.should_water,
            user_adopted,
            "AI inference completed"
        );
        Ok(())
    }

    /// Record one observed API call.
    pub fn record_api_call(&self) {
        self.with_store_mut(|store| {
            store.system.api_call_count += 1;
        });
    }

    /// Record one observed broker message.
    pub fn record_broker_message(&self) {
        self.with_store_mut(|store| {
            store.system.message_count += 1;
        });
    }

    /// Record a system error.
    ///
    /// Increments the error counter and emits a structured error log entry.
    /// Never fails; this is safe to call from any error path, including the
    /// engine's own persistence failures.
    pub fn record_error(&self, error: &(dyn std::error::Error + '_), context: &str) {
        self.with_store_mut(|store| {
            store.system.error_count += 1;
        });
        tracing::error!(
            category = "system",
            error = %error,
            context,
            "System error occurred"
        );
    }

    /// Record generic user feedback for a feature.
    ///
    /// A rating of 4 or 5 counts as positive. Routing:
    /// - chatbot: appends a satisfaction rating
    /// - disease detection: appends a feedback record with an accuracy vote
    /// - irrigation: counts an adoption signal against the existing
    ///   predictions
    ///
    /// # Errors
    ///
    /// Returns [`ObservationError`] for a rating outside 1-5, or for an
    /// irrigation adoption signal when no prediction has been recorded yet.
    pub fn record_feedback(
        &self,
        feature: FeedbackFeature,
        rating: u8,
        comment: Option<String>,
    ) -> Result<(), ObservationError> {
        if let Err(err) = validate_rating(rating) {
            return Err(self.reject(err));
        }
        let positive = rating >= POSITIVE_RATING_THRESHOLD;

        match feature {
            FeedbackFeature::Chatbot => {
                self.with_store_mut(|store| {
                    store.assistant.satisfaction_ratings.push(rating);
                });
            }
            FeedbackFeature::DiseaseDetection => {
                self.with_store_mut(|store| {
                    store.diagnosis.accuracy_ratings.push(u8::from(positive));
                    store.diagnosis.feedback.push(DiagnosisFeedback {
                        is_accurate: Some(positive),
                        rating: Some(rating),
                        comment: comment.clone(),
                        analysis_id: None,
                    });
                });
            }
            FeedbackFeature::IrrigationPrediction => {
                let mut without_prediction = false;
                self.with_store_mut(|store| {
                    if store.irrigation.total_predictions == 0 {
                        without_prediction = true;
                    } else if positive {
                        store.irrigation.adopted_count += 1;
                    }
                });
                if without_prediction {
                    return Err(self.reject(ObservationError::FeedbackWithoutPrediction));
                }
            }
        }

        tracing::info!(
            category = "user_interaction",
            feature = feature.as_str(),
            rating,
            positive,
            "User interaction tracked"
        );
        Ok(())
    }

    /// Take a point-in-time snapshot of all aggregates plus derived metrics.
    ///
    /// The snapshot is a clone; holding it never blocks recording.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = self.clock.now();
        let store = self.with_store(Clone::clone);
        let derived = DerivedMetrics::compute(&store);
        let uptime_hours = store.uptime_hours(now);
        MetricsSnapshot {
            timestamp: now,
            assistant: store.assistant,
            diagnosis: store.diagnosis,
            irrigation: store.irrigation,
            system: SystemSnapshot {
                started_at: store.system.started_at,
                uptime_hours,
                error_count: store.system.error_count,
                api_call_count: store.system.api_call_count,
                message_count: store.system.message_count,
            },
            derived,
        }
    }

    /// Render the current snapshot for external monitoring systems.
    ///
    /// See [`MetricsFormat`] for the available formats.
    #[must_use]
    pub fn export_metrics(&self, format: MetricsFormat) -> String {
        export::render(&self.snapshot(), format)
    }

    /// Replace all aggregates with fresh zero-state.
    ///
    /// The start timestamp is re-anchored at the clock's current time.
    /// Gating this to non-production environments is the caller's policy;
    /// the engine itself applies no restriction.
    pub fn reset_all(&self) {
        let started_at = self.clock.now();
        self.with_store_mut(|store| store.reset(started_at));
        tracing::info!(category = "system", "Metrics reset");
    }

    /// Run a closure over an immutable view of the store.
    fn with_store<R>(&self, f: impl FnOnce(&MetricsStore) -> R) -> R {
        match self.store.read() {
            Ok(store) => f(&store),
            Err(poison_error) => {
                tracing::warn!(
                    error = %poison_error,
                    "Reading metrics from poisoned lock, using recovered data"
                );
                f(&poison_error.into_inner())
            }
        }
    }

    /// Run a closure over a mutable view of the store.
    fn with_store_mut(&self, f: impl FnOnce(&mut MetricsStore)) {
        match self.store.write() {
            Ok(mut store) => f(&mut store),
            Err(poison_error) => {
                tracing::error!(
                    error = %poison_error,
                    "Failed to update metrics: RwLock poisoned"
                );
            }
        }
    }

    /// Count a rejected observation and hand the error back to the caller.
    fn reject(&self, err: ObservationError) -> ObservationError {
        self.with_store_mut(|store| {
            store.system.error_count += 1;
        });
        tracing::error!(
            category = "system",
            error = %err,
            context = "invalid_observation",
            "System error occurred"
        );
        err
    }
}
