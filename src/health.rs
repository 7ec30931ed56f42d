//! Health evaluation policy.
//!
//! Turns a [`MetricsSnapshot`] into a healthy/unhealthy verdict. The policy is a
//! pure function of the snapshot and a fixed threshold: every checked metric must
//! be strictly below [`HEALTH_THRESHOLD_PERCENT`]. A reading that was expected
//! but is missing fails closed.

use axum::http::StatusCode;
use serde::Serialize;

use crate::config::HEALTH_THRESHOLD_PERCENT;
use crate::metrics::MetricsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// State of a single metric as seen by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Missing,
}

impl From<Option<f64>> for Reading {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Reading::Missing, Reading::Value)
    }
}

impl Reading {
    fn passes(self) -> bool {
        match self {
            Reading::Value(v) => v < HEALTH_THRESHOLD_PERCENT,
            // Fail closed
            Reading::Missing => false,
        }
    }
}

/// Which metrics take part in the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthPolicy {
    pub check_disk: bool,
}

impl Default for HealthPolicy {
    fn default() -> Self {
        Self { check_disk: true }
    }
}

/// Readings reported in the `checks` object of a health response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthChecks {
    pub cpu: f64,
    pub memory: f64,
    /// Outer `None`: disk not checked, field omitted. `Some(None)`: checked but
    /// missing, serialized as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthVerdict {
    pub status: HealthStatus,
    pub checks: HealthChecks,
}

impl HealthVerdict {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }

    pub fn status_code(&self) -> StatusCode {
        self.status.status_code()
    }
}

/// Evaluate a snapshot against the fixed threshold.
pub fn evaluate(snapshot: &MetricsSnapshot, policy: HealthPolicy) -> HealthVerdict {
    let mut readings = vec![
        Reading::Value(snapshot.cpu_percent),
        Reading::Value(snapshot.memory_percent),
    ];
    if policy.check_disk {
        readings.push(Reading::from(snapshot.disk_percent));
    }

    let status = if readings.into_iter().all(Reading::passes) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Unhealthy
    };

    HealthVerdict {
        status,
        checks: HealthChecks {
            cpu: snapshot.cpu_percent,
            memory: snapshot.memory_percent,
            disk: policy.check_disk.then_some(snapshot.disk_percent),
        },
    }
}
