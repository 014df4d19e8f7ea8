//! Authentication Models
//!
//! Data structures for authentication requests, responses, and user information.

use serde::{Deserialize, Serialize};

use crate::database::models::{UserId, UserProfile};

/// Identity extracted from a verified token, attached to the request for the
/// rest of its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "emailAdress")]
    pub email_adress: Option<String>,
    pub password: Option<String>,
}

/// Result of a successful login: the public profile plus the token.
/// Serialized flat, so `data` reads `{id, firstName, ..., token}`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}
