//! Request context middleware
//!
//! Stamps every response with a unique `X-Request-ID` for cross-service
//! tracing and an `X-Process-Time` header for latency monitoring.

use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Attach a request id and processing time to the response.
pub async fn request_context(request: Request<Body>, next: Next<Body>) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let process_time = format!("{:.6}", started.elapsed().as_secs_f64());
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        headers.insert(REQUEST_ID_HEADER, value);
    }
    if let Ok(value) = HeaderValue::from_str(&process_time) {
        headers.insert(PROCESS_TIME_HEADER, value);
    }

    response
}
