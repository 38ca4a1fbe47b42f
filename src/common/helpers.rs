// Helper functions for safe logging and request parsing

use axum::{extract::rejection::JsonRejection, Json};

use super::error::ApiError;

/// Unwraps a JSON body, turning a missing or malformed body into a
/// validation error instead of axum's plain-text rejection
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::ValidationError(format!("Invalid JSON body: {}", e.body_text())))
}

/// Masks email addresses for safe logging
///
/// `user@example.com` becomes `u***@example.com`
pub fn safe_email_log(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***@***.***".to_string(),
    }
}

/// Masks tokens for safe logging, keeping only the first and last 4 characters
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// JSON keys whose values never reach the logs
pub const REDACTED_KEYS: &[&str] = &[
    "password",
    "password_hash",
    "token",
    "access_token",
    "refresh_token",
    "spotify_access_token",
    "spotify_refresh_token",
];

/// Replaces sensitive values in a JSON document, recursively
pub fn redact_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if REDACTED_KEYS.contains(&key.as_str()) {
                    *v = serde_json::Value::String("***".to_string());
                } else {
                    redact_json(v);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {}
    }
}
