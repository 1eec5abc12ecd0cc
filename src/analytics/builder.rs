//! Report construction.
//!
//! Builds point-in-time daily and weekly report documents from a metrics
//! snapshot. Insights and recommendations come from a fixed, ordered rule
//! list evaluated top to bottom; each rule independently appends zero or one
//! entry, so report contents are deterministic for a given snapshot.

use chrono::Duration;

use crate::metrics::MetricsSnapshot;

use super::report::{
    AssistantPerformance, DiagnosisPerformance, DiseaseCount, FeatureAdoption,
    FeatureSatisfaction, Insight, IrrigationPerformance, Priority, Recommendation, Report,
    ReportPeriod, ReportPerformance, ReportSummary, ReportType, Severity, SystemHealth,
    TrendDirection, Trends, UserBehavior,
};

/// Fallback rate above which an insight fires.
const FALLBACK_RATE_WARNING: f64 = 0.2;

/// Satisfaction rate below which an insight fires.
const SATISFACTION_RATE_WARNING: f64 = 0.7;

/// Diagnosis accuracy below which an insight fires.
const DIAGNOSIS_ACCURACY_WARNING: f64 = 0.8;

/// Mean confidence below which an informational insight fires.
const MEAN_CONFIDENCE_INFO: f64 = 0.7;

/// Adoption rate below which an insight fires.
const ADOPTION_RATE_WARNING: f64 = 0.5;

/// Error rate above which a critical insight fires.
const ERROR_RATE_CRITICAL: f64 = 0.05;

/// Response time above which a recommendation fires, in milliseconds.
const RESPONSE_TIME_RECOMMENDATION_MS: f64 = 3000.0;

/// Processing time above which a recommendation fires, in milliseconds.
const PROCESSING_TIME_RECOMMENDATION_MS: f64 = 10_000.0;

/// Diagnosis accuracy below which a retraining recommendation fires.
const DIAGNOSIS_ACCURACY_RECOMMENDATION: f64 = 0.85;

/// Topic coverage below which a filtering recommendation fires.
const TOPIC_COVERAGE_RECOMMENDATION: f64 = 0.9;

/// Error count at or above which overall health needs attention.
const HEALTHY_ERROR_COUNT_LIMIT: u64 = 10;

/// Number of diseases listed in the weekly top-disease section.
const TOP_DISEASE_LIMIT: usize = 5;

/// Build a daily report from the given snapshot.
#[must_use]
pub fn build_daily_report(snapshot: &MetricsSnapshot) -> Report {
    Report {
        report_type: ReportType::Daily,
        generated_at: snapshot.timestamp,
        period: ReportPeriod {
            start: snapshot.timestamp - Duration::hours(24),
            end: snapshot.timestamp,
        },
        summary: build_summary(snapshot),
        performance: build_performance(snapshot),
        insights: generate_insights(snapshot),
        recommendations: generate_recommendations(snapshot),
        trends: None,
        top_diseases: None,
        user_behavior: None,
    }
}

/// Build a weekly report from the given snapshot.
///
/// `previous` is the most recent persisted weekly report, used for
/// week-over-week trend directions; with no history every direction is
/// [`TrendDirection::Unknown`].
#[must_use]
pub fn build_weekly_report(snapshot: &MetricsSnapshot, previous: Option<&Report>) -> Report {
    let mut report = build_daily_report(snapshot);
    report.report_type = ReportType::Weekly;
    report.period = ReportPeriod {
        start: snapshot.timestamp - Duration::days(7),
        end: snapshot.timestamp,
    };
    report.trends = Some(analyze_trends(snapshot, previous));
    report.top_diseases = Some(top_diseases(snapshot));
    report.user_behavior = Some(analyze_user_behavior(snapshot));
    report
}

/// Headline totals from the snapshot.
fn build_summary(snapshot: &MetricsSnapshot) -> ReportSummary {
    ReportSummary {
        total_assistant_requests: snapshot.assistant.total_requests,
        total_diagnosis_analyses: snapshot.diagnosis.total_analyses,
        total_irrigation_predictions: snapshot.irrigation.total_predictions,
        uptime_hours: snapshot.system.uptime_hours,
        error_rate: snapshot.derived.error_rate,
    }
}

/// Per-domain performance blocks from the derived metrics.
fn build_performance(snapshot: &MetricsSnapshot) -> ReportPerformance {
    ReportPerformance {
        assistant: AssistantPerformance {
            average_response_time_ms: snapshot.derived.average_response_time_ms,
            satisfaction_rate: snapshot.derived.satisfaction_rate,
            topic_coverage_rate: snapshot.derived.topic_coverage_rate,
            fallback_rate: snapshot.derived.fallback_rate,
        },
        diagnosis: DiagnosisPerformance {
            average_processing_time_ms: snapshot.derived.average_processing_time_ms,
            accuracy: snapshot.derived.diagnosis_accuracy,
            mean_confidence: snapshot.derived.mean_confidence,
        },
        irrigation: IrrigationPerformance {
            accuracy: snapshot.derived.irrigation_accuracy,
            adoption_rate: snapshot.derived.adoption_rate,
            water_savings_ml: snapshot.irrigation.water_savings_ml,
        },
    }
}

/// Evaluate the fixed insight rule list against the snapshot.
///
/// Rules fire on the literal thresholds even for an empty store (an empty
/// store reports zero rates, which reads as low satisfaction/accuracy), so a
/// report generated before any traffic carries several warnings.
#[must_use]
pub fn generate_insights(snapshot: &MetricsSnapshot) -> Vec<Insight> {
    let derived = &snapshot.derived;
    let mut insights = Vec::new();

    if derived.fallback_rate > FALLBACK_RATE_WARNING {
        insights.push(Insight {
            severity: Severity::Warning,
            category: "chatbot".into(),
            message: format!(
                "High fallback rate ({:.1}%). Consider improving AI model or expanding knowledge base.",
                derived.fallback_rate * 100.0
            ),
        });
    }

    if derived.satisfaction_rate < SATISFACTION_RATE_WARNING {
        insights.push(Insight {
            severity: Severity::Warning,
            category: "chatbot".into(),
            message: format!(
                "Low user satisfaction rate ({:.1}%). Review response quality.",
                derived.satisfaction_rate * 100.0
            ),
        });
    }

    if derived.diagnosis_accuracy < DIAGNOSIS_ACCURACY_WARNING {
        insights.push(Insight {
            severity: Severity::Warning,
            category: "disease_detection".into(),
            message: format!(
                "Disease detection accuracy below 80% ({:.1}%). Model retraining may be needed.",
                derived.diagnosis_accuracy * 100.0
            ),
        });
    }

    if derived.mean_confidence < MEAN_CONFIDENCE_INFO {
        insights.push(Insight {
            severity: Severity::Info,
            category: "disease_detection".into(),
            message: format!(
                "Average confidence is {:.1}%. Consider improving image quality guidelines.",
                derived.mean_confidence * 100.0
            ),
        });
    }

    if derived.adoption_rate < ADOPTION_RATE_WARNING {
        insights.push(Insight {
            severity: Severity::Warning,
            category: "irrigation_prediction".into(),
            message: format!(
                "Low user adoption rate ({:.1}%). Review prediction accuracy and user experience.",
                derived.adoption_rate * 100.0
            ),
        });
    }

    if derived.error_rate > ERROR_RATE_CRITICAL {
        insights.push(Insight {
            severity: Severity::Critical,
            category: "system".into(),
            message: format!(
                "High error rate ({:.2}%). Immediate attention required.",
                derived.error_rate * 100.0
            ),
        });
    }

    insights
}

/// Evaluate the fixed recommendation rule list against the snapshot.
#[must_use]
pub fn generate_recommendations(snapshot: &MetricsSnapshot) -> Vec<Recommendation> {
    let derived = &snapshot.derived;
    let mut recommendations = Vec::new();

    if derived.average_response_time_ms > RESPONSE_TIME_RECOMMENDATION_MS {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "performance".into(),
            action: "Optimize assistant response time".into(),
            details: "Current average response time exceeds 3 seconds. Consider caching, model optimization, or infrastructure scaling.".into(),
        });
    }

    if derived.average_processing_time_ms > PROCESSING_TIME_RECOMMENDATION_MS {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "performance".into(),
            action: "Optimize image processing pipeline".into(),
            details: "Disease detection processing time is high. Consider model quantization or GPU acceleration.".into(),
        });
    }

    if derived.diagnosis_accuracy < DIAGNOSIS_ACCURACY_RECOMMENDATION {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "accuracy".into(),
            action: "Improve disease detection model".into(),
            details: "Collect more training data, especially for underperforming disease categories.".into(),
        });
    }

    if derived.topic_coverage_rate < TOPIC_COVERAGE_RECOMMENDATION {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "user_experience".into(),
            action: "Improve content filtering".into(),
            details: "Users are asking non-plant questions. Enhance scope detection and user guidance.".into(),
        });
    }

    recommendations
}

/// Week-over-week usage directions plus the coarse health label.
fn analyze_trends(snapshot: &MetricsSnapshot, previous: Option<&Report>) -> Trends {
    let overall_system_health = if snapshot.system.error_count < HEALTHY_ERROR_COUNT_LIMIT {
        SystemHealth::Good
    } else {
        SystemHealth::NeedsAttention
    };

    previous.map_or(
        Trends {
            assistant_usage: TrendDirection::Unknown,
            diagnosis_usage: TrendDirection::Unknown,
            irrigation_usage: TrendDirection::Unknown,
            overall_system_health,
        },
        |prev| Trends {
            assistant_usage: direction(
                snapshot.assistant.total_requests,
                prev.summary.total_assistant_requests,
            ),
            diagnosis_usage: direction(
                snapshot.diagnosis.total_analyses,
                prev.summary.total_diagnosis_analyses,
            ),
            irrigation_usage: direction(
                snapshot.irrigation.total_predictions,
                prev.summary.total_irrigation_predictions,
            ),
            overall_system_health,
        },
    )
}

/// Compare a running total against the previous report's value.
const fn direction(current: u64, previous: u64) -> TrendDirection {
    if current > previous {
        TrendDirection::Increasing
    } else if current < previous {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    }
}

/// Top diseases by detection count.
fn top_diseases(snapshot: &MetricsSnapshot) -> Vec<DiseaseCount> {
    snapshot
        .diagnosis
        .top_diseases(TOP_DISEASE_LIMIT)
        .into_iter()
        .map(|(disease, count)| DiseaseCount { disease, count })
        .collect()
}

/// Feature adoption booleans plus per-feature satisfaction proxies.
fn analyze_user_behavior(snapshot: &MetricsSnapshot) -> UserBehavior {
    UserBehavior {
        feature_adoption: FeatureAdoption {
            chatbot: snapshot.assistant.total_requests > 0,
            disease_detection: snapshot.diagnosis.total_analyses > 0,
            irrigation_prediction: snapshot.irrigation.total_predictions > 0,
        },
        user_satisfaction: FeatureSatisfaction {
            chatbot: snapshot.derived.satisfaction_rate,
            disease_detection: snapshot.derived.diagnosis_accuracy,
            irrigation_prediction: snapshot.derived.adoption_rate,
        },
    }
}
