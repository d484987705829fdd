// AI-Readiness Platform - Foundation Layer
// Validated configuration and dependency health for the Individual AI-R Platform services

//! # AI-Readiness Platform Foundation
//!
//! This crate provides the foundation layer every platform service builds
//! on: a fully validated, immutable configuration snapshot and a dependency
//! health subsystem with the four standard probe endpoints.
//!
//! ## Core Components
//!
//! ### Configuration Model
//! - [`Settings`]: one immutable, validated snapshot of all settings
//! - [`SecretString`]: masked wrapper for provider credentials
//! - [`SettingsCache`]: single-slot memo with explicit invalidation
//!
//! Construction is atomic: either every field passes its own constraint and
//! the cross-field weight sums hold, or the load fails with the complete
//! list of violations. No partially valid snapshot is ever observable.
//!
//! ### Dependency Health
//! - [`DependencyProbe`]: seam for checking one external dependency
//! - [`aggregate_status`]: precedence-ordered fold over probe reports
//! - `health::endpoints`: basic / detailed / readiness / liveness behavior
//!
//! ### HTTP Surface
//! A thin Axum layer ([`ApiServer`]) exposing the health routes; the only
//! status-code contract is readiness "not ready" → 503.

// Configuration schema, validation, secrets, and caching
pub mod config;

// Dependency probes, aggregation, and endpoint behaviors
pub mod health;

// Axum HTTP surface
pub mod api;

// Re-export the types most callers need, so users don't have to navigate
// the module hierarchy.
pub use config::{
    Environment, LogLevel, SecretString, Settings, SettingsCache, PARAMETER_VERSION, SECRET_MASK,
    WEIGHT_SUM_TOLERANCE,
};
pub use health::{
    aggregate_status, default_probes, DependencyProbe, DependencyReport, DependencyStatus,
    DetailedHealth, HealthSummary, Liveness, OverallStatus, Readiness,
};
pub use api::{ApiConfig, ApiServer, ApiServerBuilder, AppState};

use thiserror::Error;

/// Error type for platform foundation operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Configuration failed validation. Carries one human-readable message
    /// per violation; field-level violations are collected together, the
    /// cross-field weight-sum violation arrives alone once fields pass.
    #[error("configuration invalid: {}", violations.join("; "))]
    ConfigurationInvalid { violations: Vec<String> },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlatformError {
    /// The individual violation messages of a configuration failure.
    pub fn violations(&self) -> &[String] {
        match self {
            PlatformError::ConfigurationInvalid { violations } => violations,
            _ => &[],
        }
    }
}

/// Type alias for Results that use our error type
pub type Result<T> = std::result::Result<T, PlatformError>;
