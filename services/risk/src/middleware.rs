//! Risk service middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use uuid::Uuid;

/// Request logging middleware
///
/// Tags each request with a fresh id, echoed back in `x-request-id`.
pub async fn request_logging(mut request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    if let Ok(value) = request_id.to_string().parse() {
        request.headers_mut().insert("x-request-id", value);
    }

    let mut response = next.run(request).await;

    let duration = start.elapsed();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        uri = %uri.path(),
        status = %response.status(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    if let Ok(value) = request_id.to_string().parse() {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}
