//! Authentication and authorization failures.
//!
//! Each variant maps to exactly one HTTP status in `crate::errors`. None of
//! them carry store or crypto detail that could end up in a response body.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never told apart
    #[error("User not found or password invalid")]
    InvalidCredentials,

    #[error("Authorization header missing")]
    MissingToken,

    /// Bad signature, malformed, expired, or not a bearer token
    #[error("Not authorized")]
    InvalidToken,

    #[error("Unauthorized access: resource belongs to another user")]
    OwnershipMismatch,

    #[error("{0} not found")]
    ResourceNotFound(String),

    #[error("Credential store unavailable")]
    StoreUnavailable,

    #[error("Failed to sign token")]
    SigningError,
}
