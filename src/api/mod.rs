//! HTTP surface for the platform foundation
//!
//! A thin Axum layer over the configuration and health subsystems: the four
//! health routes, request-context middleware, and a server builder. All
//! domain behavior lives below this module; handlers only adapt outputs to
//! status codes.

pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::SettingsCache;
use crate::health::probes::{default_probes, DependencyProbe};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<SettingsCache>,
    pub probes: Arc<Vec<Box<dyn DependencyProbe>>>,
}

/// API server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_enabled: false,
        }
    }
}

/// Health API server.
pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the Axum router with all health routes.
    pub fn create_router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(handlers::basic_health))
            .route("/health/detailed", get(handlers::detailed_health))
            .route("/health/ready", get(handlers::readiness))
            .route("/health/live", get(handlers::liveness))
            .fallback(handlers::not_found)
            .with_state(self.state.clone())
            .layer(from_fn(middleware::request_context));

        if self.config.cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Run the server until it is shut down.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = self.create_router();
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!("📡 Health API listening on http://{}", addr);
        info!("   GET http://{}/health", addr);
        info!("   GET http://{}/health/detailed", addr);
        info!("   GET http://{}/health/ready", addr);
        info!("   GET http://{}/health/live", addr);

        axum::Server::bind(&addr.parse()?)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}

/// Builder for [`ApiServer`].
pub struct ApiServerBuilder {
    config: ApiConfig,
    settings: Option<Arc<SettingsCache>>,
    probes: Option<Vec<Box<dyn DependencyProbe>>>,
}

impl ApiServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
            settings: None,
            probes: None,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    /// Share an existing settings cache instead of creating a fresh one.
    pub fn with_settings_cache(mut self, cache: Arc<SettingsCache>) -> Self {
        self.settings = Some(cache);
        self
    }

    /// Replace the default probe set.
    pub fn with_probes(mut self, probes: Vec<Box<dyn DependencyProbe>>) -> Self {
        self.probes = Some(probes);
        self
    }

    pub fn build(self) -> ApiServer {
        let state = AppState {
            settings: self
                .settings
                .unwrap_or_else(|| Arc::new(SettingsCache::new())),
            probes: Arc::new(self.probes.unwrap_or_else(default_probes)),
        };
        ApiServer::new(self.config, state)
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_overrides() {
        let server = ApiServerBuilder::new()
            .with_host("127.0.0.1")
            .with_port(9000)
            .with_cors(true)
            .build();
        assert_eq!(server.config.host, "127.0.0.1");
        assert_eq!(server.config.port, 9000);
        assert!(server.config.cors_enabled);
    }

    #[test]
    fn builder_defaults_to_full_probe_set() {
        let server = ApiServerBuilder::new().build();
        assert_eq!(server.state.probes.len(), 3);
    }

    #[tokio::test]
    async fn liveness_route_carries_request_context_headers() {
        use axum::http::{Method, Request, StatusCode};
        use tower::ServiceExt;

        // Liveness never consults the settings cache, so the fresh, empty
        // cache built here is irrelevant to the outcome.
        let app = ApiServerBuilder::new().build().create_router();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/health/live")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));
        assert!(response
            .headers()
            .contains_key(middleware::PROCESS_TIME_HEADER));
    }
}
