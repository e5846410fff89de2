//! Custom error types for the gateway service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::chat::ChatError;

/// Custom error type for the chat endpoints
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Language model failure
    #[error(transparent)]
    Chat(#[from] ChatError),

    /// Internal server error
    #[error("Internal server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Chat(e) => {
                let status = match e {
                    ChatError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    ChatError::Unauthorized => StatusCode::UNAUTHORIZED,
                    ChatError::ContentBlocked => StatusCode::BAD_REQUEST,
                    ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match e {
                    ChatError::Upstream(_) => {
                        "An unexpected error occurred while processing your request.".to_string()
                    }
                    other => other.to_string(),
                };
                (status, message)
            }
            ApiError::Internal(e) => {
                error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (ChatError::RateLimited.into(), StatusCode::TOO_MANY_REQUESTS),
            (ChatError::Unauthorized.into(), StatusCode::UNAUTHORIZED),
            (ChatError::ContentBlocked.into(), StatusCode::BAD_REQUEST),
            (
                ChatError::Upstream("x".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                anyhow::anyhow!("disk on fire").into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
