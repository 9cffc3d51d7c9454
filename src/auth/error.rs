// Authentication error types

use crate::error::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Authentication and account error types
#[derive(Debug, Error)]
pub enum AuthError {
    /// Request body failed field validation
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Wrong email or password on login
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Token failed signature verification or session lookup
    #[error("invalid token")]
    InvalidToken,

    /// Token signature was valid but the token has expired
    #[error("token has expired")]
    ExpiredToken,

    /// No Authorization header or no Bearer scheme
    #[error("missing authentication token")]
    MissingToken,

    /// Registration or email change hit the unique email index
    #[error("email already in use")]
    EmailTaken,

    /// Malformed or disallowed request content
    #[error("{0}")]
    BadRequest(String),

    #[error("password hashing failed")]
    PasswordHash,

    #[error("token generation failed: {0}")]
    TokenGeneration(String),

    #[error("database error: {0}")]
    Database(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AuthError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "VALIDATION_ERROR",
                    "Request validation failed".to_string(),
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({}))),
                ),
            ),
            AuthError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(
                    "INVALID_CREDENTIALS",
                    "Invalid email or password".to_string(),
                    None,
                ),
            ),
            // Every token failure collapses to the same generic 401 so a
            // caller cannot distinguish a bad signature from a revoked
            // session or a deleted user.
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::MissingToken => {
                warn!("Rejected request: {}", self);
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new(
                        "UNAUTHENTICATED",
                        "Please authenticate".to_string(),
                        None,
                    ),
                )
            }
            AuthError::EmailTaken => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("EMAIL_TAKEN", "Email already in use".to_string(), None),
            ),
            AuthError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("BAD_REQUEST", message.clone(), None),
            ),
            AuthError::PasswordHash | AuthError::TokenGeneration(_) | AuthError::Database(_) => {
                error!("Auth internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "Internal server error".to_string(),
                        None,
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::BAD_REQUEST,
            AuthError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenGeneration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_failures_are_all_unauthorized() {
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::ExpiredToken.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bad_credentials_are_bad_request() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
    }
}
