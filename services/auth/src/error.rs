//! Error type for authentication failures

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::jwt::TokenError;

/// Custom error type for authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing, malformed, expired or invalid credentials
    #[error("{0}")]
    Unauthenticated(String),

    /// Registration with an email that already exists
    #[error("Email already registered")]
    Conflict,

    /// Input rejected by validation
    #[error("{0}")]
    Validation(String),

    /// The authenticated subject has no user record
    #[error("User not found")]
    NotFound,

    /// Anything unexpected, details stay in the logs
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// Generic login failure shared by every credential mismatch
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthenticated("Incorrect email or password".to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Unauthenticated(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::Conflict => StatusCode::CONFLICT,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Internal(e) => {
                error!("Authentication internal error: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(serde_json::json!({
            "error": self.to_string(),
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
