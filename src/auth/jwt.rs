//! JWT Token Service
//!
//! Issues and verifies the HS256 tokens handed out at login. The payload binds
//! a single `userId`; nothing else in it is trusted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::errors::AuthError;
use crate::config::AuthConfig;
use crate::database::models::UserId;

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User the token was issued to
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
}

/// A freshly signed token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        // Expiry is checked by hand in `verify_at` so that the boundary is exact
        // and testable; jsonwebtoken still insists the claim is present.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Generate a token for a user, valid for the configured window
    pub fn issue(&self, user_id: UserId) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<IssuedToken, AuthError> {
        let expiration = now + self.ttl;
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT signing error: {}", e);
                AuthError::SigningError
            })?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Validate a bare token and return the identity bound to it
    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Validate a token as of `now` (seconds since the epoch). The token is
    /// accepted while `now < exp`.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {:?}", e.kind());
                AuthError::InvalidToken
            })?;

        if now >= data.claims.exp {
            tracing::debug!("JWT expired at {} (now {})", data.claims.exp, now);
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims.user_id)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOKEN_TTL_DAYS;
    use chrono::TimeZone;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&AuthConfig::new(secret, Duration::days(DEFAULT_TOKEN_TTL_DAYS)))
    }

    #[test]
    fn test_jwt_roundtrip() {
        let jwt_service = service("test_secret");

        let issued = jwt_service.issue(42).unwrap();
        assert!(!issued.token.is_empty());

        assert_eq!(jwt_service.verify(&issued.token).unwrap(), 42);
        // Verification has no side effects
        assert_eq!(jwt_service.verify(&issued.token).unwrap(), 42);
    }

    #[test]
    fn payload_carries_user_id_claim() {
        let jwt_service = service("test_secret");
        let issued = jwt_service.issue(7).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let raw = decode::<serde_json::Value>(
            &issued.token,
            &DecodingKey::from_secret(b"test_secret"),
            &validation,
        )
        .unwrap();
        assert_eq!(raw.claims["userId"], 7);
        assert_eq!(raw.claims["exp"], issued.expires_at);
    }

    #[test]
    fn expiry_uses_configured_window() {
        let jwt_service = service("test_secret");
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let issued = jwt_service.issue_at(1, now).unwrap();
        assert_eq!(issued.expires_at, (now + Duration::days(12)).timestamp());
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let jwt_service = service("test_secret");
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let issued = jwt_service.issue_at(3, now).unwrap();
        let exp = issued.expires_at;

        assert_eq!(jwt_service.verify_at(&issued.token, exp - 1), Ok(3));
        assert_eq!(jwt_service.verify_at(&issued.token, exp), Err(AuthError::InvalidToken));
        assert_eq!(jwt_service.verify_at(&issued.token, exp + 1), Err(AuthError::InvalidToken));
    }

    #[test]
    fn token_issued_long_ago_is_rejected_now() {
        let jwt_service = service("test_secret");
        let issued = jwt_service
            .issue_at(3, Utc::now() - Duration::days(DEFAULT_TOKEN_TTL_DAYS + 1))
            .unwrap();
        assert_eq!(jwt_service.verify(&issued.token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_token_signed_with_other_key() {
        let issuer = service("first_secret");
        let verifier = service("second_secret");
        let issued = issuer.issue(5).unwrap();

        assert_eq!(verifier.verify(&issued.token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_garbage_and_tampered_tokens() {
        let jwt_service = service("test_secret");
        assert_eq!(jwt_service.verify("garbage"), Err(AuthError::InvalidToken));
        assert_eq!(jwt_service.verify(""), Err(AuthError::InvalidToken));

        // Payload of a token for user 6 under the signature of one for user 5
        let mine: Vec<String> = jwt_service.issue(5).unwrap().token.split('.').map(String::from).collect();
        let theirs: Vec<String> = jwt_service.issue(6).unwrap().token.split('.').map(String::from).collect();
        let tampered = format!("{}.{}.{}", mine[0], theirs[1], mine[2]);
        assert_eq!(jwt_service.verify(&tampered), Err(AuthError::InvalidToken));
    }

    #[test]
    fn rejects_token_without_expiry() {
        #[derive(Serialize)]
        struct NoExp {
            #[serde(rename = "userId")]
            user_id: UserId,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &NoExp { user_id: 1 },
            &EncodingKey::from_secret(b"test_secret"),
        )
        .unwrap();

        assert_eq!(service("test_secret").verify(&token), Err(AuthError::InvalidToken));
    }
}
