//! Login: credential lookup, password check, token issuance.

use std::sync::Arc;

use crate::auth::errors::AuthError;
use crate::auth::jwt::JwtService;
use crate::auth::models::LoginResponse;
use crate::auth::password;
use crate::database::store::UserStore;

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt_service: Arc<JwtService>) -> Self {
        password::prepare_dummy_hash();
        Self { users, jwt_service }
    }

    /// Exchange an email and password for a token.
    ///
    /// Unknown email, duplicate email rows and a wrong password all fail with
    /// `InvalidCredentials`. Store trouble fails with `StoreUnavailable`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        tracing::debug!("Attempting login for {}", email);

        let mut records = self
            .users
            .find_credentials_by_email(email)
            .await
            .map_err(|e| {
                tracing::error!("Credential lookup failed: {}", e);
                AuthError::StoreUnavailable
            })?;

        if records.len() != 1 {
            if records.len() > 1 {
                tracing::error!("{} accounts share the email {}", records.len(), email);
            }
            password::verify_without_account(password);
            tracing::info!("Login rejected: user not found or password invalid");
            return Err(AuthError::InvalidCredentials);
        }
        let record = records.remove(0);

        if !password::verify_password(password, &record.password_hash) {
            tracing::info!("Login rejected: user not found or password invalid");
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.jwt_service.issue(record.id())?;
        tracing::info!("User {} logged in", record.id());

        Ok(LoginResponse {
            user: record.profile,
            token: issued.token,
            expires_at: issued.expires_at,
        })
    }
}
