use std::time::Instant;

use axum::{body::Body, extract::Request, middleware::Next, response::Response};

/// Emits a structured event for every response in the 4xx/5xx range so
/// failures are visible even when the client swallows the body.
pub async fn log_error_responses(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;
    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(%method, %uri, status = status.as_u16(), latency_ms, "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %uri, status = status.as_u16(), latency_ms, "request rejected");
    }

    response
}
