//! API error types with IntoResponse
//!
//! Errors are converted to JSON responses with appropriate status codes.
//! The body is `{"error": <message>, "code": <machine code>}`; the booking
//! form shows `error` to the user as-is.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::auth::AuthError;
use crate::db::repos::DbError;
use crate::models::{CapacityExceeded, ValidationError};

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Body or query string could not be decoded (400)
    Malformed { message: String },

    /// Slot cannot take the requested tables (400)
    Capacity(CapacityExceeded),

    /// Resource already exists (400)
    Conflict { message: String },

    /// Token missing, expired or forged (401)
    Unauthorized(AuthError),

    /// Resource not found (404)
    NotFound { message: String },

    /// Database error (500, logged)
    Database(DbError),

    /// No database connection could be obtained (503, logged)
    Unavailable(DbError),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::Malformed { .. }
            | Self::Capacity(_)
            | Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            Self::Validation(e) => ("validation_error", e.to_string()),
            Self::Malformed { message } => {
                tracing::debug!(error = %message, "request not decoded");
                ("validation_error", message.clone())
            }
            Self::Capacity(e) => ("capacity_exceeded", e.to_string()),
            Self::Conflict { message } => ("conflict", message.clone()),
            Self::Unauthorized(e) => {
                tracing::debug!(error = %e, "token rejected");
                ("unauthorized", e.user_message().to_string())
            }
            Self::NotFound { message } => ("not_found", message.clone()),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                ("internal_error", "Database error".to_string())
            }
            Self::Unavailable(e) => {
                tracing::error!("Database connection error: {}", e);
                ("unavailable", "Database connection error".to_string())
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Malformed {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Malformed {
            message: rejection.body_text(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        Self::Unauthorized(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, .. } => {
                Self::not_found(format!("{} not found", capitalize(resource)))
            }
            DbError::Conflict { resource, .. } => Self::Conflict {
                message: format!("{} already registered", capitalize(resource)),
            },
            DbError::Capacity(c) => Self::Capacity(c),
            e if e.is_connection_error() => Self::Unavailable(e),
            e => Self::Database(e),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
