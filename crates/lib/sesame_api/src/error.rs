//! Application error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sesame_core::auth::{AuthError, AuthenticatorError, DEFAULT_CHALLENGE};
use thiserror::Error;
use tracing::warn;

/// Message shown for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Denied username")]
    DeniedUsername,

    /// Authentication required or rejected. The challenge, when set, is
    /// returned in `www-authenticate`.
    #[error("Unauthorized")]
    Unauthorized { challenge: Option<String> },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::DeniedUsername => (
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                INVALID_CREDENTIALS_MESSAGE,
            ),
            AppError::Unauthorized { .. } => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                INVALID_CREDENTIALS_MESSAGE,
            ),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::BackendUnavailable(m) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "backend_unavailable",
                m.as_str(),
            ),
            AppError::Internal(m) => {
                warn!("internal error: {m}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        let mut response = (status, body).into_response();

        if let AppError::Unauthorized {
            challenge: Some(challenge),
        } = &self
        {
            let value = HeaderValue::from_str(challenge)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CHALLENGE));
            response.headers_mut().insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::DeniedUsername(_) => AppError::DeniedUsername,
            AuthError::AuthenticationFailed(e) => AppError::Unauthorized {
                challenge: Some(e.challenge().to_string()),
            },
            AuthError::NoAccessibleTenant(e) => AppError::Forbidden(e.to_string()),
            AuthError::Session(e) => AppError::Internal(e.to_string()),
            AuthError::Expiry(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthenticatorError> for AppError {
    fn from(e: AuthenticatorError) -> Self {
        match e {
            AuthenticatorError::Rejected { .. } => AppError::Unauthorized {
                challenge: Some(e.challenge().to_string()),
            },
            _ => AppError::BackendUnavailable(e.to_string()),
        }
    }
}
