//! Dependency health subsystem
//!
//! Probes check each external dependency concurrently; the aggregator folds
//! their reports into one overall verdict consumed by the health endpoints.

pub mod endpoints;
pub mod probes;

use serde::{Deserialize, Serialize};

pub use endpoints::{DetailedHealth, HealthSummary, Liveness, Readiness};
pub use probes::{default_probes, CacheProbe, DatabaseProbe, DependencyProbe, InferenceProbe};

/// Status of a single dependency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStatus {
    Healthy,
    Degraded,
    Unhealthy,
    /// The dependency's credential or endpoint is absent; no check ran.
    NotConfigured,
}

impl std::fmt::Display for DependencyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DependencyStatus::Healthy => "healthy",
            DependencyStatus::Degraded => "degraded",
            DependencyStatus::Unhealthy => "unhealthy",
            DependencyStatus::NotConfigured => "not_configured",
        };
        f.write_str(label)
    }
}

/// Aggregated verdict across all probes. `not_configured` never appears here;
/// it folds into `degraded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OverallStatus::Healthy => "healthy",
            OverallStatus::Degraded => "degraded",
            OverallStatus::Unhealthy => "unhealthy",
        };
        f.write_str(label)
    }
}

/// Outcome of checking one external dependency. Produced fresh on every
/// health-check invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub name: String,
    pub status: DependencyStatus,
    /// Round-trip time; present only when a probe actually executed.
    pub latency_ms: Option<f64>,
    /// Present only when the status is not healthy.
    pub error: Option<String>,
}

impl DependencyReport {
    pub fn healthy(name: impl Into<String>, latency_ms: f64) -> Self {
        Self {
            name: name.into(),
            status: DependencyStatus::Healthy,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn degraded(name: impl Into<String>, latency_ms: Option<f64>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DependencyStatus::Degraded,
            latency_ms,
            error: Some(error.into()),
        }
    }

    pub fn unhealthy(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DependencyStatus::Unhealthy,
            latency_ms: None,
            error: Some(error.into()),
        }
    }

    pub fn not_configured(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DependencyStatus::NotConfigured,
            latency_ms: None,
            error: Some(error.into()),
        }
    }
}

/// Fold probe reports into one overall status.
///
/// Precedence: any `unhealthy` wins outright; otherwise any `degraded`;
/// otherwise any `not_configured` downgrades a still-healthy overall to
/// `degraded`; otherwise `healthy`. `not_configured` never escalates to
/// `unhealthy`.
pub fn aggregate_status<'a>(
    reports: impl IntoIterator<Item = &'a DependencyReport>,
) -> OverallStatus {
    let mut overall = OverallStatus::Healthy;
    for report in reports {
        match report.status {
            DependencyStatus::Unhealthy => return OverallStatus::Unhealthy,
            DependencyStatus::Degraded => overall = OverallStatus::Degraded,
            DependencyStatus::NotConfigured => {
                if overall == OverallStatus::Healthy {
                    overall = OverallStatus::Degraded;
                }
            }
            DependencyStatus::Healthy => {}
        }
    }
    overall
}
