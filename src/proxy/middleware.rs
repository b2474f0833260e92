//! Middleware implementations for the gateway

use crate::proxy::error_response::extract_request_id;
use crate::proxy::headers::X_REQUEST_ID;
use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

fn fresh_request_id() -> Option<HeaderValue> {
    HeaderValue::from_str(&Uuid::now_v7().to_string()).ok()
}

/// Request ID middleware - ensures every request has a unique ID for tracing.
///
/// A valid UUID supplied by the caller is kept, anything else is replaced.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .and_then(|uuid| HeaderValue::from_str(&uuid.to_string()).ok())
        .or_else(fresh_request_id);

    if let Some(id) = &request_id {
        request.headers_mut().insert(X_REQUEST_ID, id.clone());
    }

    let mut response = next.run(request).await;

    if let Some(id) = request_id {
        response.headers_mut().insert(X_REQUEST_ID, id);
    }

    response
}

/// Logging middleware - logs request/response details with timing.
///
/// Logs the matched route template rather than the raw path so that
/// path-embedded keys never reach the logs; query strings are never logged.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "<unmatched>".to_string());
    let request_id =
        extract_request_id(request.headers()).unwrap_or_else(|| "unknown".to_string());

    info!(
        request_id = request_id,
        method = %method,
        route = %route,
        "Incoming request"
    );

    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        warn!(
            request_id = request_id,
            method = %method,
            route = %route,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            request_id = request_id,
            method = %method,
            route = %route,
            status = status.as_u16(),
            duration_ms = duration.as_millis(),
            "Request completed"
        );
    }

    response
}
