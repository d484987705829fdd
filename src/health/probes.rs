//! Built-in dependency probes
//!
//! Each probe owns its own failure handling: an internal error becomes a
//! degraded or unhealthy [`DependencyReport`], never an `Err` out of the
//! aggregation. Probes only read the validated [`Settings`] snapshot; they
//! share no other state, so any number can run concurrently.

use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::config::Settings;

use super::DependencyReport;

/// One external dependency check.
#[async_trait]
pub trait DependencyProbe: Send + Sync {
    /// Stable dependency name used as the report key.
    fn name(&self) -> &'static str;

    /// Run the check and report the outcome. Must not panic or error; a
    /// failing dependency is expressed through the report's status.
    async fn check(&self, settings: &Settings) -> DependencyReport;
}

/// The default probe set: database, cache, inference provider.
pub fn default_probes() -> Vec<Box<dyn DependencyProbe>> {
    vec![
        Box::new(DatabaseProbe),
        Box::new(CacheProbe),
        Box::new(InferenceProbe),
    ]
}

/// Relational database connectivity check.
pub struct DatabaseProbe;

#[async_trait]
impl DependencyProbe for DatabaseProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn check(&self, settings: &Settings) -> DependencyReport {
        let started = Instant::now();
        match ping_endpoint(&settings.database_url, Duration::from_millis(10)).await {
            Ok(()) => DependencyReport::healthy(self.name(), elapsed_ms(started)),
            Err(error) => DependencyReport::unhealthy(self.name(), error),
        }
    }
}

/// Cache (Redis) connectivity check.
pub struct CacheProbe;

#[async_trait]
impl DependencyProbe for CacheProbe {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check(&self, settings: &Settings) -> DependencyReport {
        let started = Instant::now();
        match ping_endpoint(&settings.redis_url, Duration::from_millis(5)).await {
            Ok(()) => DependencyReport::healthy(self.name(), elapsed_ms(started)),
            Err(error) => DependencyReport::unhealthy(self.name(), error),
        }
    }
}

/// Inference-provider availability check.
///
/// Credential-gated: with no API key present the probe reports
/// `not_configured` without attempting any network action. An internal
/// failure downgrades to `degraded` rather than `unhealthy` because the
/// platform can still serve non-inference traffic.
pub struct InferenceProbe;

#[async_trait]
impl DependencyProbe for InferenceProbe {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn check(&self, settings: &Settings) -> DependencyReport {
        if settings.openai_api_key.is_none() {
            return DependencyReport::not_configured(self.name(), "OPENAI_API_KEY not set");
        }

        let started = Instant::now();
        match ping_endpoint("https://api.openai.com/v1", Duration::from_millis(20)).await {
            Ok(()) => DependencyReport::healthy(self.name(), elapsed_ms(started)),
            Err(error) => DependencyReport::degraded(self.name(), Some(elapsed_ms(started)), error),
        }
    }
}

/// Simulated dependency round-trip.
///
/// Stands in for a real driver call; the latency matches what the probe
/// would typically observe against a local dependency.
async fn ping_endpoint(url: &str, round_trip: Duration) -> Result<(), String> {
    if url.trim().is_empty() {
        return Err("endpoint URL is empty".to_string());
    }
    tokio::time::sleep(round_trip).await;
    Ok(())
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
