//! Observation input types.
//!
//! These are the values producers hand to the engine on every event. They are
//! plain data; validation happens inside the record operations so that a
//! rejected observation leaves the store untouched.

use serde::{Deserialize, Serialize};

use crate::error::ObservationError;

/// Lowest accepted user rating.
pub(crate) const MIN_RATING: u8 = 1;

/// Highest accepted user rating.
pub(crate) const MAX_RATING: u8 = 5;

/// A rating at or above this value counts as positive feedback.
pub(crate) const POSITIVE_RATING_THRESHOLD: u8 = 4;

/// A disease identified by one diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetectedDisease {
    /// Model-assigned disease name (dynamic, discovered at runtime).
    pub name: String,
}

impl DetectedDisease {
    /// Create a detected disease from its name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// User feedback attached to a diagnosis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DiagnosisFeedback {
    /// Whether the user judged the diagnosis accurate.
    pub is_accurate: Option<bool>,
    /// User rating on the 1-5 scale.
    pub rating: Option<u8>,
    /// Free-text comment.
    pub comment: Option<String>,
    /// Identifier of the analysis this feedback refers to.
    pub analysis_id: Option<String>,
}

/// Irrigation model output for one prediction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrrigationPrediction {
    /// Whether the model recommends watering. `None` when the model
    /// abstained.
    pub should_water: Option<bool>,
    /// Recommended water amount in milliliters.
    pub water_amount_ml: Option<f64>,
}

/// Observed real-world outcome for an irrigation prediction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IrrigationOutcome {
    /// Whether watering actually turned out to be needed.
    pub was_needed: bool,
}

/// Feature a piece of generic user feedback refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackFeature {
    /// The conversational assistant.
    Chatbot,
    /// Image-based disease detection.
    DiseaseDetection,
    /// Irrigation forecasting.
    IrrigationPrediction,
}

impl FeedbackFeature {
    /// Stable name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chatbot => "chatbot",
            Self::DiseaseDetection => "disease_detection",
            Self::IrrigationPrediction => "irrigation_prediction",
        }
    }
}

/// Validate a confidence value against the closed interval `[0.0, 1.0]`.
pub(crate) fn validate_confidence(value: f64) -> Result<(), ObservationError> {
    if !(0.0..=1.0).contains(&value) || value.is_nan() {
        return Err(ObservationError::ConfidenceOutOfRange { value });
    }
    Ok(())
}

/// Validate a user rating against the 1-5 scale.
pub(crate) fn validate_rating(value: u8) -> Result<(), ObservationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&value) {
        return Err(ObservationError::RatingOutOfRange { value });
    }
    Ok(())
}

/// Compute a non-negative duration in milliseconds from two timestamps.
pub(crate) fn duration_ms(
    started_at: chrono::DateTime<chrono::Utc>,
    completed_at: chrono::DateTime<chrono::Utc>,
) -> Result<u64, ObservationError> {
    let millis = (completed_at - started_at).num_milliseconds();
    u64::try_from(millis).map_err(|_| ObservationError::NegativeDuration {
        started_at: started_at.timestamp_millis(),
        completed_at: completed_at.timestamp_millis(),
    })
}
