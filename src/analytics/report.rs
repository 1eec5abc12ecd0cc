//! Report document types.
//!
//! A [`Report`] is an immutable, timestamped snapshot summarizing metrics
//! over a period. Reports are created by the builder, serialized to one JSON
//! file each, and never mutated or deleted by the engine (retention is an
//! external concern).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Generated every 24 hours.
    Daily,
    /// Generated weekly, anchored to Sundays.
    Weekly,
}

impl ReportType {
    /// Stable name used in filenames and log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

/// The time window a report covers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportPeriod {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
}

/// Headline totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    /// Assistant turns recorded so far.
    pub total_assistant_requests: u64,
    /// Disease analyses recorded so far.
    pub total_diagnosis_analyses: u64,
    /// Irrigation predictions recorded so far.
    pub total_irrigation_predictions: u64,
    /// Engine uptime in hours.
    pub uptime_hours: f64,
    /// Errors per observed API call.
    pub error_rate: f64,
}

/// Assistant performance block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantPerformance {
    /// Mean response time in milliseconds.
    pub average_response_time_ms: f64,
    /// Mean satisfaction rating rescaled to `0..=1`.
    pub satisfaction_rate: f64,
    /// Share of turns that stayed on topic.
    pub topic_coverage_rate: f64,
    /// Share of turns answered by the fallback path.
    pub fallback_rate: f64,
}

/// Diagnosis performance block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisPerformance {
    /// Mean processing time in milliseconds.
    pub average_processing_time_ms: f64,
    /// Share of feedback votes judging results accurate.
    pub accuracy: f64,
    /// Mean model confidence.
    pub mean_confidence: f64,
}

/// Irrigation performance block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IrrigationPerformance {
    /// Share of predictions matching observed outcomes.
    pub accuracy: f64,
    /// Share of predictions the user adopted.
    pub adoption_rate: f64,
    /// Estimated water saved, in milliliters.
    pub water_savings_ml: f64,
}

/// Per-domain performance blocks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportPerformance {
    /// Conversational assistant.
    pub assistant: AssistantPerformance,
    /// Disease diagnosis.
    pub diagnosis: DiagnosisPerformance,
    /// Irrigation forecasting.
    pub irrigation: IrrigationPerformance,
}

/// Insight severity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational observation.
    Info,
    /// Degradation worth reviewing.
    Warning,
    /// Requires immediate attention.
    Critical,
}

/// A rule-derived observation about the current metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    /// How urgent the observation is.
    pub severity: Severity,
    /// Which subsystem it concerns.
    pub category: String,
    /// Human-readable message with the measured value.
    pub message: String,
}

/// Recommendation priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Act soon.
    High,
    /// Schedule.
    Medium,
    /// Nice to have.
    Low,
}

/// A rule-derived suggested action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    /// How urgent the action is.
    pub priority: Priority,
    /// Which concern it addresses.
    pub category: String,
    /// Short action statement.
    pub action: String,
    /// Longer rationale.
    pub details: String,
}

/// Direction of a usage trend relative to the previous report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Usage grew since the previous report.
    Increasing,
    /// Usage shrank since the previous report.
    Decreasing,
    /// Usage is unchanged.
    Stable,
    /// No previous report to compare against.
    Unknown,
}

/// Coarse system health label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SystemHealth {
    /// Error count is within tolerance.
    Good,
    /// Error count is elevated.
    NeedsAttention,
}

/// Week-over-week trend labels (weekly reports only).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trends {
    /// Assistant usage direction.
    pub assistant_usage: TrendDirection,
    /// Diagnosis usage direction.
    pub diagnosis_usage: TrendDirection,
    /// Irrigation usage direction.
    pub irrigation_usage: TrendDirection,
    /// Coarse health label from the error counter.
    pub overall_system_health: SystemHealth,
}

/// One entry in the weekly top-disease list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiseaseCount {
    /// Disease name.
    pub disease: String,
    /// Times it was detected.
    pub count: u64,
}

/// Which features have seen any use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureAdoption {
    /// Any assistant turns recorded.
    pub chatbot: bool,
    /// Any diagnoses recorded.
    pub disease_detection: bool,
    /// Any predictions recorded.
    pub irrigation_prediction: bool,
}

/// Per-feature satisfaction proxies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureSatisfaction {
    /// Assistant satisfaction rate.
    pub chatbot: f64,
    /// Diagnosis accuracy, used as the satisfaction proxy.
    pub disease_detection: f64,
    /// Irrigation adoption rate, used as the satisfaction proxy.
    pub irrigation_prediction: f64,
}

/// User behavior summary (weekly reports only).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserBehavior {
    /// Which features have seen any use.
    pub feature_adoption: FeatureAdoption,
    /// Per-feature satisfaction proxies.
    pub user_satisfaction: FeatureSatisfaction,
}

/// An immutable report document.
///
/// Weekly reports carry the three optional sections; daily reports leave
/// them `None` and they are omitted from the serialized form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    /// Report cadence.
    pub report_type: ReportType,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// The window the report covers.
    pub period: ReportPeriod,
    /// Headline totals.
    pub summary: ReportSummary,
    /// Per-domain performance.
    pub performance: ReportPerformance,
    /// Rule-derived observations, in rule order.
    pub insights: Vec<Insight>,
    /// Rule-derived actions, in rule order.
    pub recommendations: Vec<Recommendation>,
    /// Week-over-week trends (weekly only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<Trends>,
    /// Top five diseases by detection count (weekly only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_diseases: Option<Vec<DiseaseCount>>,
    /// User behavior summary (weekly only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_behavior: Option<UserBehavior>,
}

impl Report {
    /// File name this report persists under: `{type}-report-{ISO date}.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "{}-report-{}.json",
            self.report_type.as_str(),
            self.generated_at.date_naive()
        )
    }
}
