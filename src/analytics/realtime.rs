//! Real-time analytics overview.
//!
//! An on-demand health document for dashboards: current load per domain,
//! system health figures, and threshold alerts. Unlike reports this is never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsSnapshot;

use super::report::Severity;

/// Average response time above which an alert fires, in milliseconds.
const RESPONSE_TIME_ALERT_MS: f64 = 5000.0;

/// Error rate above which a critical alert fires.
const ERROR_RATE_ALERT: f64 = 0.1;

/// Event volume per domain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentLoad {
    /// Assistant turns recorded.
    pub assistant_requests: u64,
    /// Disease analyses recorded.
    pub diagnosis_analyses: u64,
    /// Irrigation predictions recorded.
    pub irrigation_predictions: u64,
}

/// Live health figures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SystemHealthStatus {
    /// Engine uptime in hours.
    pub uptime_hours: f64,
    /// Errors per observed API call.
    pub error_rate: f64,
    /// Mean assistant response time in milliseconds.
    pub assistant_response_time_ms: f64,
    /// Mean diagnosis processing time in milliseconds.
    pub diagnosis_processing_time_ms: f64,
}

/// A threshold breach worth surfacing immediately.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// How urgent the breach is.
    pub level: Severity,
    /// Human-readable description.
    pub message: String,
    /// The measured value.
    pub value: f64,
    /// The threshold it crossed.
    pub threshold: f64,
}

/// The full on-demand overview document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealtimeOverview {
    /// When the overview was assembled.
    pub timestamp: DateTime<Utc>,
    /// Event volume per domain.
    pub current_load: CurrentLoad,
    /// Live health figures.
    pub system_health: SystemHealthStatus,
    /// Active threshold alerts, in rule order.
    pub alerts: Vec<Alert>,
}

impl RealtimeOverview {
    /// Assemble an overview from the given snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            current_load: CurrentLoad {
                assistant_requests: snapshot.assistant.total_requests,
                diagnosis_analyses: snapshot.diagnosis.total_analyses,
                irrigation_predictions: snapshot.irrigation.total_predictions,
            },
            system_health: SystemHealthStatus {
                uptime_hours: snapshot.system.uptime_hours,
                error_rate: snapshot.derived.error_rate,
                assistant_response_time_ms: snapshot.derived.average_response_time_ms,
                diagnosis_processing_time_ms: snapshot.derived.average_processing_time_ms,
            },
            alerts: generate_alerts(snapshot),
        }
    }
}

/// Evaluate the alert rules against the snapshot.
fn generate_alerts(snapshot: &MetricsSnapshot) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if snapshot.derived.average_response_time_ms > RESPONSE_TIME_ALERT_MS {
        alerts.push(Alert {
            level: Severity::Warning,
            message: "Assistant response time is high".into(),
            value: snapshot.derived.average_response_time_ms,
            threshold: RESPONSE_TIME_ALERT_MS,
        });
    }

    if snapshot.derived.error_rate > ERROR_RATE_ALERT {
        alerts.push(Alert {
            level: Severity::Critical,
            message: "System error rate is high".into(),
            value: snapshot.derived.error_rate,
            threshold: ERROR_RATE_ALERT,
        });
    }

    alerts
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::test_utils::{engine_at, fixed_time};
    use chrono::Duration;

    #[test]
    fn test_overview_from_empty_snapshot() {
        let snapshot = engine_at(fixed_time()).snapshot();
        let overview = RealtimeOverview::from_snapshot(&snapshot);

        assert_eq!(overview.timestamp, fixed_time());
        assert_eq!(overview.current_load.assistant_requests, 0);
        assert_eq!(overview.system_health.error_rate, 0.0);
        assert!(overview.alerts.is_empty());
    }

    #[test]
    fn test_slow_responses_raise_warning_alert() {
        let engine = engine_at(fixed_time());
        let start = fixed_time();
        engine
            .record_assistant_turn(
                start,
                start + Duration::milliseconds(8000),
                true,
                false,
                None,
            )
            .unwrap();

        let overview = RealtimeOverview::from_snapshot(&engine.snapshot());
        assert_eq!(overview.alerts.len(), 1);
        assert_eq!(overview.alerts[0].level, Severity::Warning);
        assert_eq!(overview.alerts[0].value, 8000.0);
        assert_eq!(overview.alerts[0].threshold, 5000.0);
    }

    #[test]
    fn test_error_rate_raises_critical_alert() {
        let engine = engine_at(fixed_time());
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        for _ in 0..10 {
            engine.record_api_call();
        }
        for _ in 0..2 {
            engine.record_error(&io_err, "test");
        }

        let overview = RealtimeOverview::from_snapshot(&engine.snapshot());
        assert_eq!(overview.alerts.len(), 1);
        assert_eq!(overview.alerts[0].level, Severity::Critical);
        assert_eq!(overview.alerts[0].value, 0.2);
    }

    #[test]
    fn test_overview_serde_round_trip() {
        let snapshot = engine_at(fixed_time()).snapshot();
        let overview = RealtimeOverview::from_snapshot(&snapshot);
        let json = serde_json::to_string(&overview).unwrap();
        let parsed: RealtimeOverview = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, overview);
    }
}
