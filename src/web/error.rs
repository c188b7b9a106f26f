//! API error handling for the Agora REST surface.
//!
//! Every failure is rendered as `{"success": false, "message": "..."}`.
//! Internal errors are logged and replaced with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::{AuthError, LoginError, RegistrationError};
use crate::AgoraError;

/// Message returned for any unexpected failure.
pub const INTERNAL_MESSAGE: &str = "Server error";

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always false.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error with the generic message.
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, INTERNAL_MESSAGE)
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message sent to the client.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Take the first message out of validator errors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {field}"))
                })
            })
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());
        Self::bad_request(message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            success: false,
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<AgoraError> for ApiError {
    fn from(err: AgoraError) -> Self {
        match err {
            AgoraError::Validation(msg) => ApiError::bad_request(msg),
            AgoraError::DuplicateReport => ApiError::bad_request(err.to_string()),
            AgoraError::Unauthenticated(msg) => ApiError::unauthorized(msg),
            AgoraError::Forbidden(msg) => ApiError::forbidden(msg),
            AgoraError::NotFound(_) => ApiError::not_found(err.to_string()),
            other => {
                tracing::error!(error = %other, "Internal error");
                ApiError::internal()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(msg) => {
                tracing::error!(error = %msg, "Identity lookup failed");
                ApiError::internal()
            }
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Database(msg) => {
                tracing::error!(error = %msg, "Registration failed");
                ApiError::internal()
            }
            RegistrationError::Password(crate::auth::PasswordError::HashError(msg)) => {
                tracing::error!(error = %msg, "Password hashing failed");
                ApiError::internal()
            }
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::InvalidCredentials => ApiError::unauthorized(err.to_string()),
            LoginError::Database(msg) => {
                tracing::error!(error = %msg, "Login failed");
                ApiError::internal()
            }
        }
    }
}
