//! Application error type for the HTTP boundary.
//!
//! Every failure is rendered through the same envelope as a success. Store and
//! signing details are logged here and replaced with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::errors::AuthError;
use crate::database::store::StoreError;
use crate::response::error_body;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Request body failed field validation
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(err) => match err {
                AuthError::InvalidCredentials
                | AuthError::MissingToken
                | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::OwnershipMismatch => StatusCode::FORBIDDEN,
                AuthError::ResourceNotFound(_) => StatusCode::NOT_FOUND,
                AuthError::StoreUnavailable | AuthError::SigningError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::MissingReference(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to send to the client
    fn public_message(&self) -> String {
        match self {
            ApiError::Auth(AuthError::StoreUnavailable) | ApiError::Store(StoreError::Unavailable(_)) => {
                "Service temporarily unavailable".to_string()
            }
            ApiError::Store(StoreError::Conflict(_)) => "Resource already exists".to_string(),
            ApiError::Store(StoreError::MissingReference(_)) => "Referenced resource not found".to_string(),
            ApiError::Store(StoreError::Query(_)) | ApiError::Auth(AuthError::SigningError) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }
        (status, error_body(status, &self.public_message())).into_response()
    }
}

/// Fallback for unknown routes
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
