//! HTTP error responses.
//!
//! `ApiError` wraps `GymError` and maps its kind to a status code:
//!
//! | Kind | Status |
//! |------|--------|
//! | Validation | 400 |
//! | NotFound | 404 |
//! | Conflict | 409 |
//! | Internal | 500 |
//!
//! The body is `{"code": "...", "message": "...", "fields": {...}}`, with
//! `fields` present only for validation failures.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuthError, FieldErrors, ValidationError};
use crate::domain::{ErrorKind, GymError};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Offending fields, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fields: None,
        }
    }
}

/// Handler error for application failures.
#[derive(Debug)]
pub struct ApiError(pub GymError);

impl From<GymError> for ApiError {
    fn from(err: GymError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<FieldErrors> for ApiError {
    fn from(err: FieldErrors) -> Self {
        Self(err.into())
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = ErrorResponse {
            code: self.0.code().to_string(),
            message: self.0.message(),
            fields: self.0.fields().cloned().map(FieldErrors::into_map),
        };
        (status, Json(body)).into_response()
    }
}

/// Handler error for identity failures.
#[derive(Debug)]
pub struct AuthApiError(pub AuthError);

impl From<AuthError> for AuthApiError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AuthError::UserExists => (StatusCode::CONFLICT, "USER_EXISTS"),
            AuthError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            AuthError::ServiceUnavailable(detail) => {
                tracing::error!(error = %detail, "Identity service unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, "AUTH_UNAVAILABLE")
            }
        };

        let message = match &self.0 {
            AuthError::ServiceUnavailable(_) => "Authentication service unavailable".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
