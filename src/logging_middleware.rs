// src/logging_middleware.rs
//! Middleware for logging request and response bodies at debug level

use axum::body::to_bytes;
use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use tracing::{debug, Level};

use crate::common::helpers::redact_json;

/// Renders a body for the log with credentials masked. Non-JSON bodies are
/// logged as text; binary bodies are skipped.
fn loggable(bytes: &Bytes) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let text = std::str::from_utf8(bytes).ok()?;

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(mut json) => {
            redact_json(&mut json);
            Some(serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.to_string()))
        }
        Err(_) => Some(text.to_string()),
    }
}

/// Logs request and response bodies when debug logging is enabled;
/// otherwise passes the request straight through
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(request_body) = loggable(&bytes) {
        debug!(
            method = %parts.method,
            uri = %parts.uri,
            request_body = %request_body,
            "Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if let Some(response_body) = loggable(&bytes) {
        debug!(
            status = %parts.status,
            response_body = %response_body,
            "Response"
        );
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
