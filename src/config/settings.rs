//! Validated application settings
//!
//! [`Settings`] is the immutable snapshot produced by layering env-style
//! overrides on top of the schema defaults. Construction is all-or-nothing:
//! every field-level constraint is checked first (all violations reported
//! together), and only when the whole table passes do the cross-field
//! weight-sum invariants run. A snapshot is never mutated in place; new
//! overrides always produce a brand-new snapshot.

use std::collections::BTreeMap;

use crate::{PlatformError, Result};

use super::schema::{self, FieldValue};
use super::secret::SecretString;

/// Revision tag of the scoring-parameter validation rules.
///
/// Independent of overrides; bumped only when the parameter schema itself
/// changes.
pub const PARAMETER_VERSION: &str = "v1.0";

/// Absolute tolerance for the weight-sum invariants.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.001;

/// Deployment environment the service runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum severity emitted by the logging layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }

    /// Directive understood by `tracing_subscriber`'s env filter.
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable, fully validated configuration snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // Application identity
    pub app_name: String,
    pub app_version: String,
    pub app_env: Environment,
    pub debug: bool,
    pub log_level: LogLevel,

    // API surface
    pub api_v1_prefix: String,
    pub api_v2_prefix: String,
    pub api_host: String,
    pub api_port: u16,

    // Storage
    pub database_url: String,
    pub database_pool_size: u32,
    pub database_max_overflow: u32,
    pub redis_url: String,

    // Inference providers
    pub openai_api_key: Option<SecretString>,
    pub anthropic_api_key: Option<SecretString>,
    pub model_assessment: String,
    pub model_scoring: String,
    pub model_chat: String,
    pub model_embedding: String,
    pub model_fallback_chain: Vec<String>,

    // Cost management
    pub daily_cost_budget_usd: f64,
    pub cost_alert_threshold_pct: f64,

    // Scoring parameters
    pub alpha_vr_weight: f64,
    pub beta_synergy_coef: f64,
    pub w_fluency: f64,
    pub w_domain: f64,
    pub w_adaptive: f64,
    pub theta_technical: f64,
    pub theta_productivity: f64,
    pub theta_judgment: f64,
    pub theta_velocity: f64,
    pub delta_position: f64,
    pub gamma_experience: f64,

    // External labor-market APIs
    pub onet_api_url: String,
    pub onet_api_key: Option<SecretString>,
    pub bls_api_url: String,
    pub bls_api_key: Option<SecretString>,

    // Observability
    pub otel_exporter_otlp_endpoint: String,
    pub langsmith_api_key: Option<SecretString>,
    pub langsmith_project: String,

    // Guardrails
    pub guardrails_enabled: bool,
    pub pii_detection_enabled: bool,
    pub rate_limit_requests_per_minute: u32,

    // Batch processing
    pub batch_broker_url: String,
    pub batch_max_concurrency: u32,
}

impl Settings {
    /// Build a validated snapshot from explicit overrides.
    ///
    /// Override keys match schema keys case-insensitively; unknown keys are
    /// ignored. Fails with [`PlatformError::ConfigurationInvalid`] carrying
    /// every field-level violation, or the cross-field violation once all
    /// fields pass individually.
    pub fn load(overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut values = schema::resolve(overrides)
            .map_err(|violations| PlatformError::ConfigurationInvalid { violations })?;

        let settings = Self {
            app_name: take_str(&mut values, "APP_NAME"),
            app_version: take_str(&mut values, "APP_VERSION"),
            app_env: environment(take_str(&mut values, "APP_ENV")),
            debug: take_bool(&mut values, "DEBUG"),
            log_level: log_level(take_str(&mut values, "LOG_LEVEL")),
            api_v1_prefix: take_str(&mut values, "API_V1_PREFIX"),
            api_v2_prefix: take_str(&mut values, "API_V2_PREFIX"),
            api_host: take_str(&mut values, "API_HOST"),
            api_port: take_int(&mut values, "API_PORT") as u16,
            database_url: take_str(&mut values, "DATABASE_URL"),
            database_pool_size: take_int(&mut values, "DATABASE_POOL_SIZE") as u32,
            database_max_overflow: take_int(&mut values, "DATABASE_MAX_OVERFLOW") as u32,
            redis_url: take_str(&mut values, "REDIS_URL"),
            openai_api_key: take_secret(&mut values, "OPENAI_API_KEY"),
            anthropic_api_key: take_secret(&mut values, "ANTHROPIC_API_KEY"),
            model_assessment: take_str(&mut values, "MODEL_ASSESSMENT"),
            model_scoring: take_str(&mut values, "MODEL_SCORING"),
            model_chat: take_str(&mut values, "MODEL_CHAT"),
            model_embedding: take_str(&mut values, "MODEL_EMBEDDING"),
            model_fallback_chain: take_list(&mut values, "MODEL_FALLBACK_CHAIN"),
            daily_cost_budget_usd: take_float(&mut values, "DAILY_COST_BUDGET_USD"),
            cost_alert_threshold_pct: take_float(&mut values, "COST_ALERT_THRESHOLD_PCT"),
            alpha_vr_weight: take_float(&mut values, "ALPHA_VR_WEIGHT"),
            beta_synergy_coef: take_float(&mut values, "BETA_SYNERGY_COEF"),
            w_fluency: take_float(&mut values, "W_FLUENCY"),
            w_domain: take_float(&mut values, "W_DOMAIN"),
            w_adaptive: take_float(&mut values, "W_ADAPTIVE"),
            theta_technical: take_float(&mut values, "THETA_TECHNICAL"),
            theta_productivity: take_float(&mut values, "THETA_PRODUCTIVITY"),
            theta_judgment: take_float(&mut values, "THETA_JUDGMENT"),
            theta_velocity: take_float(&mut values, "THETA_VELOCITY"),
            delta_position: take_float(&mut values, "DELTA_POSITION"),
            gamma_experience: take_float(&mut values, "GAMMA_EXPERIENCE"),
            onet_api_url: take_str(&mut values, "ONET_API_URL"),
            onet_api_key: take_secret(&mut values, "ONET_API_KEY"),
            bls_api_url: take_str(&mut values, "BLS_API_URL"),
            bls_api_key: take_secret(&mut values, "BLS_API_KEY"),
            otel_exporter_otlp_endpoint: take_str(&mut values, "OTEL_EXPORTER_OTLP_ENDPOINT"),
            langsmith_api_key: take_secret(&mut values, "LANGSMITH_API_KEY"),
            langsmith_project: take_str(&mut values, "LANGSMITH_PROJECT"),
            guardrails_enabled: take_bool(&mut values, "GUARDRAILS_ENABLED"),
            pii_detection_enabled: take_bool(&mut values, "PII_DETECTION_ENABLED"),
            rate_limit_requests_per_minute: take_int(&mut values, "RATE_LIMIT_REQUESTS_PER_MINUTE")
                as u32,
            batch_broker_url: take_str(&mut values, "BATCH_BROKER_URL"),
            batch_max_concurrency: take_int(&mut values, "BATCH_MAX_CONCURRENCY") as u32,
        };

        settings.validate_weight_sums()?;
        Ok(settings)
    }

    /// Build a snapshot from the current process environment.
    pub fn from_env() -> Result<Self> {
        let overrides: BTreeMap<String, String> = std::env::vars().collect();
        Self::load(&overrides)
    }

    /// Cross-field invariants, checked only after every field passed its own
    /// constraint.
    fn validate_weight_sums(&self) -> Result<()> {
        let vr_sum = self.w_fluency + self.w_domain + self.w_adaptive;
        if (vr_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PlatformError::ConfigurationInvalid {
                violations: vec![format!("V^R weights must sum to 1.0, got {:.2}", vr_sum)],
            });
        }

        let fluency_sum =
            self.theta_technical + self.theta_productivity + self.theta_judgment + self.theta_velocity;
        if (fluency_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PlatformError::ConfigurationInvalid {
                violations: vec![format!(
                    "Fluency weights must sum to 1.0, got {:.2}",
                    fluency_sum
                )],
            });
        }

        Ok(())
    }

    /// Revision tag of the validation rules in force.
    pub fn parameter_version(&self) -> &'static str {
        PARAMETER_VERSION
    }

    /// Whether the snapshot targets the production environment.
    pub fn is_production(&self) -> bool {
        self.app_env == Environment::Production
    }
}

// Extraction helpers. The schema guarantees which variant each key resolves
// to, so a mismatch here is a programming error, not an input error.

fn take_str(values: &mut BTreeMap<&'static str, FieldValue>, key: &str) -> String {
    match values.remove(key) {
        Some(FieldValue::Str(s)) => s,
        other => unreachable!("schema resolves {} to a string, got {:?}", key, other),
    }
}

fn take_bool(values: &mut BTreeMap<&'static str, FieldValue>, key: &str) -> bool {
    match values.remove(key) {
        Some(FieldValue::Bool(b)) => b,
        other => unreachable!("schema resolves {} to a bool, got {:?}", key, other),
    }
}

fn take_int(values: &mut BTreeMap<&'static str, FieldValue>, key: &str) -> i64 {
    match values.remove(key) {
        Some(FieldValue::Int(i)) => i,
        other => unreachable!("schema resolves {} to an integer, got {:?}", key, other),
    }
}

fn take_float(values: &mut BTreeMap<&'static str, FieldValue>, key: &str) -> f64 {
    match values.remove(key) {
        Some(FieldValue::Float(f)) => f,
        other => unreachable!("schema resolves {} to a float, got {:?}", key, other),
    }
}

fn take_list(values: &mut BTreeMap<&'static str, FieldValue>, key: &str) -> Vec<String> {
    match values.remove(key) {
        Some(FieldValue::List(items)) => items,
        other => unreachable!("schema resolves {} to a list, got {:?}", key, other),
    }
}

fn take_secret(
    values: &mut BTreeMap<&'static str, FieldValue>,
    key: &str,
) -> Option<SecretString> {
    match values.remove(key) {
        Some(FieldValue::Secret(secret)) => secret,
        other => unreachable!("schema resolves {} to a secret, got {:?}", key, other),
    }
}

fn environment(canonical: String) -> Environment {
    match canonical.as_str() {
        "development" => Environment::Development,
        "staging" => Environment::Staging,
        "production" => Environment::Production,
        other => unreachable!("schema admits no environment named {:?}", other),
    }
}

fn log_level(canonical: String) -> LogLevel {
    match canonical.as_str() {
        "DEBUG" => LogLevel::Debug,
        "INFO" => LogLevel::Info,
        "WARNING" => LogLevel::Warning,
        "ERROR" => LogLevel::Error,
        other => unreachable!("schema admits no log level named {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn violations_of(result: Result<Settings>) -> Vec<String> {
        match result {
            Err(PlatformError::ConfigurationInvalid { violations }) => violations,
            other => panic!("expected ConfigurationInvalid, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn defaults_produce_a_valid_snapshot() {
        let settings = Settings::load(&BTreeMap::new()).unwrap();
        assert_eq!(settings.app_name, "Individual AI-R Platform");
        assert_eq!(settings.app_version, "4.0.0");
        assert_eq!(settings.app_env, Environment::Development);
        assert_eq!(settings.api_port, 8000);
        assert_eq!(settings.log_level, LogLevel::Info);
        assert!(settings.openai_api_key.is_none());
        assert_eq!(
            settings.model_fallback_chain,
            vec!["gpt-4-turbo", "claude-sonnet-4-20250514", "gpt-3.5-turbo"]
        );
        assert!(!settings.is_production());
        assert_eq!(settings.parameter_version(), "v1.0");
    }

    #[test]
    fn vr_weights_summing_to_one_are_accepted_exactly() {
        let settings = Settings::load(&overrides(&[
            ("W_FLUENCY", "0.3"),
            ("W_DOMAIN", "0.3"),
            ("W_ADAPTIVE", "0.4"),
        ]))
        .unwrap();
        assert_eq!(settings.w_fluency, 0.3);
        assert_eq!(settings.w_domain, 0.3);
        assert_eq!(settings.w_adaptive, 0.4);
    }

    #[test]
    fn vr_weight_sum_within_tolerance_is_accepted() {
        // 0.45 + 0.35 + 0.2005 = 1.0005, inside the 0.001 tolerance.
        let settings = Settings::load(&overrides(&[("W_ADAPTIVE", "0.2005")])).unwrap();
        assert_eq!(settings.w_adaptive, 0.2005);
    }

    #[test]
    fn vr_weight_sum_violation_names_group_and_sum() {
        let violations = violations_of(Settings::load(&overrides(&[
            ("W_FLUENCY", "0.50"),
            ("W_DOMAIN", "0.40"),
            ("W_ADAPTIVE", "0.20"),
        ])));
        assert_eq!(violations, vec!["V^R weights must sum to 1.0, got 1.10"]);
    }

    #[test]
    fn fluency_weight_sum_violation_names_group() {
        let violations = violations_of(Settings::load(&overrides(&[
            ("THETA_TECHNICAL", "0.50"),
            ("THETA_PRODUCTIVITY", "0.30"),
            ("THETA_JUDGMENT", "0.20"),
            ("THETA_VELOCITY", "0.10"),
        ])));
        assert_eq!(violations, vec!["Fluency weights must sum to 1.0, got 1.10"]);
    }

    #[test]
    fn field_violations_win_over_cross_field_checks() {
        // 1.5 is out of [0, 1]; the sum check must never run, so no
        // sum-based message may appear.
        let violations = violations_of(Settings::load(&overrides(&[("W_FLUENCY", "1.5")])));
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("W_FLUENCY"));
        assert!(!violations.iter().any(|v| v.contains("sum to 1.0")));
    }

    #[test]
    fn multiple_field_violations_are_reported_together() {
        let violations = violations_of(Settings::load(&overrides(&[
            ("W_FLUENCY", "1.5"),
            ("DAILY_COST_BUDGET_USD", "-5"),
            ("LOG_LEVEL", "CHATTY"),
        ])));
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn override_keys_are_case_insensitive() {
        let settings =
            Settings::load(&overrides(&[("app_env", "staging"), ("Api_Port", "9000")])).unwrap();
        assert_eq!(settings.app_env, Environment::Staging);
        assert_eq!(settings.api_port, 9000);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let settings = Settings::load(&overrides(&[("SOME_OTHER_TOOLS_VAR", "x")])).unwrap();
        assert_eq!(settings.app_name, "Individual AI-R Platform");
    }

    #[test]
    fn is_production_tracks_environment() {
        let settings = Settings::load(&overrides(&[("APP_ENV", "production")])).unwrap();
        assert!(settings.is_production());
        assert_eq!(settings.app_env.to_string(), "production");
    }

    #[test]
    fn secret_fields_are_wrapped_and_masked() {
        let settings =
            Settings::load(&overrides(&[("OPENAI_API_KEY", "sk-abc123")])).unwrap();
        let key = settings.openai_api_key.as_ref().unwrap();
        assert_eq!(key.reveal(), "sk-abc123");
        assert_eq!(key.to_string(), "**********");
        // Debug-printing the whole snapshot must not leak the key either.
        assert!(!format!("{:?}", settings).contains("abc123"));
    }

    #[test]
    fn reloading_with_same_overrides_compares_equal() {
        let map = overrides(&[("W_FLUENCY", "0.5"), ("W_DOMAIN", "0.3"), ("W_ADAPTIVE", "0.2")]);
        let a = Settings::load(&map).unwrap();
        let b = Settings::load(&map).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn log_level_maps_to_filter_directive() {
        let settings = Settings::load(&overrides(&[("LOG_LEVEL", "warning")])).unwrap();
        assert_eq!(settings.log_level, LogLevel::Warning);
        assert_eq!(settings.log_level.as_filter_directive(), "warn");
    }
}
