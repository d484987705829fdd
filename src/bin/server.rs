// AI-Readiness Platform - Foundation Server
// Validates configuration at startup and serves the health endpoints
// Run with: cargo run --bin server

use std::sync::Arc;

use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use air_platform::health::endpoints;
use air_platform::{ApiServerBuilder, SettingsCache};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present. In production these
    // are set by the deployment system, so a missing file is only a warning.
    if let Err(e) = dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    // RUST_LOG wins; LOG_LEVEL is the platform-native fallback. The
    // subscriber must exist before configuration loads so validation
    // failures are visible.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            EnvFilter::try_new(
                std::env::var("LOG_LEVEL")
                    .unwrap_or_else(|_| "info".to_string())
                    .to_lowercase(),
            )
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Validate configuration before anything else starts. A failed load
    // prints every violation and refuses to serve; there is no fallback to
    // defaults on partial failure.
    let cache = Arc::new(SettingsCache::new());
    let settings = match cache.get().await {
        Ok(settings) => settings,
        Err(e) => {
            error!("❌ Configuration validation failed:");
            for violation in e.violations() {
                error!("   - {}", violation);
            }
            return Err(e.into());
        }
    };

    // Pin the uptime clock before the first request can ask for it.
    endpoints::mark_started();

    info!("🚀 Starting {} v{}", settings.app_name, settings.app_version);
    info!("🌍 Environment: {}", settings.app_env);
    info!("🔢 Parameter Version: {}", settings.parameter_version());
    info!(
        "🛡️ Guardrails: {}",
        if settings.guardrails_enabled {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    info!("💰 Cost Budget: ${}/day", settings.daily_cost_budget_usd);

    // Log provider configuration without exposing any key material.
    if settings.openai_api_key.is_some() {
        info!("✅ OpenAI API key configured");
    }
    if settings.anthropic_api_key.is_some() {
        info!("✅ Anthropic API key configured");
    }

    ApiServerBuilder::new()
        .with_host(settings.api_host.clone())
        .with_port(settings.api_port)
        .with_cors(settings.debug)
        .with_settings_cache(cache)
        .build()
        .run()
        .await?;

    Ok(())
}
