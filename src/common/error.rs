// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// No session token was supplied with the request
    MissingToken(String),
    /// A session token was supplied but could not be decoded or has expired
    InvalidToken(String),
    InvalidCredentials,
    /// The session token resolved to an id with no matching user
    UserNotFound(String),
    Forbidden(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    ValidationError(String),
    InternalServer(String),
    Upstream(String),
    SpotifyAuth(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingToken(msg) => write!(f, "Missing Token: {}", msg),
            ApiError::InvalidToken(msg) => write!(f, "Invalid Token: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid credentials"),
            ApiError::UserNotFound(msg) => write!(f, "User Not Found: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream Error: {}", msg),
            ApiError::SpotifyAuth(msg) => write!(f, "Spotify Auth Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingToken(_)
            | ApiError::BadRequest(_)
            | ApiError::Conflict(_)
            | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken(_) | ApiError::InvalidCredentials | ApiError::SpotifyAuth(_) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::UserNotFound(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalServer(_) | ApiError::Upstream(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingToken(_) | ApiError::InvalidToken(_) => "INVALID_TOKEN",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::UserNotFound(_) => "USER_NOT_FOUND",
            ApiError::Forbidden(_) => "ACCESS_DENIED",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InternalServer(_) => "INTERNAL_SERVER_ERROR",
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::SpotifyAuth(_) => "SPOTIFY_AUTH_ERROR",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.code();

        let error_message = match self {
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                "Database operation failed".to_string()
            }
            ApiError::Upstream(msg) => {
                error!(error = %msg, "Upstream provider error");
                msg
            }
            ApiError::MissingToken(msg)
            | ApiError::InvalidToken(msg)
            | ApiError::UserNotFound(msg)
            | ApiError::Forbidden(msg)
            | ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ValidationError(msg)
            | ApiError::InternalServer(msg)
            | ApiError::SpotifyAuth(msg) => msg,
        };

        let error_response = ErrorResponse {
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::ValidationError(error_messages.join(", "))
        }
    }
}
