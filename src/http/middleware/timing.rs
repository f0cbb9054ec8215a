//! Request timing log.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::http::request::X_REQUEST_ID;

/// Logs method, path, status and elapsed time for every request.
pub async fn log_timing(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    if response.status().is_server_error() {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, status, elapsed_ms, "Request completed");
    } else {
        tracing::info!(request_id = %request_id, method = %method, path = %path, status, elapsed_ms, "Request completed");
    }

    response
}
