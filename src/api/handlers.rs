//! HTTP handlers for the health endpoints
//!
//! Thin adapters from the pure endpoint functions in `health::endpoints` to
//! Axum responses. The only status-code contract: a "not ready" readiness
//! verdict maps to 503; everything else answers 200 (with 404 for unknown
//! routes).

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::health::endpoints;

use super::AppState;

/// GET /health — basic responsiveness check, no probes.
pub async fn basic_health(State(state): State<AppState>) -> Response {
    match state.settings.get().await {
        Ok(settings) => Json(endpoints::basic_health(&settings)).into_response(),
        Err(error) => configuration_unavailable(error),
    }
}

/// GET /health/detailed — concurrent dependency probes plus uptime.
pub async fn detailed_health(State(state): State<AppState>) -> Response {
    match state.settings.get().await {
        Ok(settings) => {
            let health = endpoints::detailed_health(&settings, &state.probes).await;
            Json(health).into_response()
        }
        Err(error) => configuration_unavailable(error),
    }
}

/// GET /health/ready — 200 when ready, 503 with a reason otherwise.
pub async fn readiness(State(state): State<AppState>) -> Response {
    let settings = match state.settings.get().await {
        Ok(settings) => settings,
        // No valid configuration means the process must not receive traffic.
        Err(error) => {
            warn!("readiness blocked: {}", error);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "reason": error.to_string(),
                })),
            )
                .into_response();
        }
    };

    let verdict = endpoints::readiness(&settings, &state.probes).await;
    if verdict.ready {
        Json(json!({ "status": "ready" })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "not_ready",
                "reason": verdict.reason,
            })),
        )
            .into_response()
    }
}

/// GET /health/live — always alive; touches neither settings nor probes.
pub async fn liveness() -> Response {
    Json(endpoints::liveness()).into_response()
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found" })),
    )
        .into_response()
}

fn configuration_unavailable(error: crate::PlatformError) -> Response {
    warn!("configuration unavailable: {}", error);
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "status": "unhealthy",
            "reason": error.to_string(),
        })),
    )
        .into_response()
}
