//! Health endpoint behaviors
//!
//! Pure functions of the current [`Settings`] plus live probe results; the
//! HTTP layer only maps their outputs onto status codes. Probes fan out
//! concurrently and the aggregation joins on all of them completing.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use lazy_static::lazy_static;
use serde::Serialize;

use crate::config::Settings;

use super::probes::DependencyProbe;
use super::{aggregate_status, DependencyReport, OverallStatus};

lazy_static! {
    static ref STARTED_AT: Instant = Instant::now();
}

/// Pin the uptime clock to "now". Call once at process startup; otherwise the
/// clock starts at the first detailed health check.
pub fn mark_started() {
    let _ = *STARTED_AT;
}

/// Seconds since the process marked itself started.
pub fn uptime_seconds() -> f64 {
    STARTED_AT.elapsed().as_secs_f64()
}

/// Basic health response: process responsiveness plus configuration metadata.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub status: OverallStatus,
    pub version: String,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
    pub parameter_version: String,
}

/// Detailed health response with per-dependency results.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealth {
    #[serde(flatten)]
    pub summary: HealthSummary,
    pub dependencies: BTreeMap<String, DependencyReport>,
    pub uptime_seconds: f64,
}

/// Readiness decision: whether the process should receive traffic.
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub ready: bool,
    /// Embeds the overall status that caused a "not ready" verdict.
    pub reason: Option<String>,
}

/// Liveness signal: the process is running, nothing more.
#[derive(Debug, Clone, Serialize)]
pub struct Liveness {
    pub status: &'static str,
}

/// Fast check of process responsiveness; no probes run.
pub fn basic_health(settings: &Settings) -> HealthSummary {
    HealthSummary {
        status: OverallStatus::Healthy,
        version: settings.app_version.clone(),
        environment: settings.app_env.to_string(),
        timestamp: Utc::now(),
        parameter_version: settings.parameter_version().to_string(),
    }
}

/// Run every probe concurrently, join on all of them, and aggregate.
pub async fn detailed_health(
    settings: &Settings,
    probes: &[Box<dyn DependencyProbe>],
) -> DetailedHealth {
    let reports = join_all(probes.iter().map(|probe| probe.check(settings))).await;

    let status = aggregate_status(&reports);
    let dependencies: BTreeMap<String, DependencyReport> = reports
        .into_iter()
        .map(|report| (report.name.clone(), report))
        .collect();

    DetailedHealth {
        summary: HealthSummary {
            status,
            version: settings.app_version.clone(),
            environment: settings.app_env.to_string(),
            timestamp: Utc::now(),
            parameter_version: settings.parameter_version().to_string(),
        },
        dependencies,
        uptime_seconds: uptime_seconds(),
    }
}

/// Ready only when the overall status is healthy; otherwise the reason names
/// the status that blocked readiness.
pub fn readiness_of(overall: OverallStatus) -> Readiness {
    match overall {
        OverallStatus::Healthy => Readiness {
            ready: true,
            reason: None,
        },
        status => Readiness {
            ready: false,
            reason: Some(format!("Overall status: {}", status)),
        },
    }
}

/// Full readiness check: detailed health first, then the verdict.
pub async fn readiness(settings: &Settings, probes: &[Box<dyn DependencyProbe>]) -> Readiness {
    let health = detailed_health(settings, probes).await;
    readiness_of(health.summary.status)
}

/// Always alive. Deliberately takes no configuration and runs no probes: a
/// failed configuration load can block readiness, never liveness.
pub fn liveness() -> Liveness {
    Liveness { status: "alive" }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap as Map;

    use super::*;
    use crate::health::{default_probes, DependencyStatus};

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let overrides: Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::load(&overrides).unwrap()
    }

    #[test]
    fn basic_health_is_always_healthy_and_echoes_metadata() {
        let settings = settings(&[("APP_ENV", "staging")]);
        let summary = basic_health(&settings);
        assert_eq!(summary.status, OverallStatus::Healthy);
        assert_eq!(summary.version, "4.0.0");
        assert_eq!(summary.environment, "staging");
        assert_eq!(summary.parameter_version, "v1.0");
    }

    #[tokio::test]
    async fn detailed_health_without_llm_key_is_degraded() {
        let settings = settings(&[]);
        let health = detailed_health(&settings, &default_probes()).await;
        assert_eq!(health.summary.status, OverallStatus::Degraded);
        assert_eq!(health.dependencies.len(), 3);
        assert_eq!(
            health.dependencies["llm"].status,
            DependencyStatus::NotConfigured
        );
        assert_eq!(
            health.dependencies["database"].status,
            DependencyStatus::Healthy
        );
        assert!(health.uptime_seconds >= 0.0);
    }

    #[tokio::test]
    async fn detailed_health_with_llm_key_is_healthy() {
        let settings = settings(&[("OPENAI_API_KEY", "sk-test")]);
        let health = detailed_health(&settings, &default_probes()).await;
        assert_eq!(health.summary.status, OverallStatus::Healthy);
    }

    #[tokio::test]
    async fn detailed_health_with_broken_database_is_unhealthy() {
        let settings = settings(&[("DATABASE_URL", " "), ("OPENAI_API_KEY", "sk-test")]);
        let health = detailed_health(&settings, &default_probes()).await;
        assert_eq!(health.summary.status, OverallStatus::Unhealthy);
    }

    #[test]
    fn readiness_maps_overall_status() {
        assert!(readiness_of(OverallStatus::Healthy).ready);

        let degraded = readiness_of(OverallStatus::Degraded);
        assert!(!degraded.ready);
        assert_eq!(degraded.reason.as_deref(), Some("Overall status: degraded"));

        let unhealthy = readiness_of(OverallStatus::Unhealthy);
        assert!(!unhealthy.ready);
        assert_eq!(
            unhealthy.reason.as_deref(),
            Some("Overall status: unhealthy")
        );
    }

    #[tokio::test]
    async fn readiness_runs_probes_end_to_end() {
        let ready = readiness(&settings(&[("OPENAI_API_KEY", "sk-test")]), &default_probes()).await;
        assert!(ready.ready);

        let not_ready = readiness(&settings(&[]), &default_probes()).await;
        assert!(!not_ready.ready);
        assert_eq!(
            not_ready.reason.as_deref(),
            Some("Overall status: degraded")
        );
    }

    #[test]
    fn liveness_needs_no_configuration() {
        // No Settings is ever constructed here.
        assert_eq!(liveness().status, "alive");
    }

    #[test]
    fn detailed_health_serializes_flat() {
        let settings = settings(&[]);
        let health = tokio_test::block_on(detailed_health(&settings, &default_probes()));
        let json = serde_json::to_value(&health).unwrap();
        // Summary fields sit at the top level, next to dependencies/uptime.
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["version"], "4.0.0");
        assert_eq!(json["dependencies"]["llm"]["status"], "not_configured");
        assert!(json["uptime_seconds"].is_number());
    }
}
