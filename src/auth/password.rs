//! Password hashing and verification (Argon2, PHC string format).

use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString}};
use once_cell::sync::Lazy;

const DUMMY_PASSWORD: &str = "no-account-has-this-password-0";

/// Checked when no account matched, so an unknown email costs one argon2
/// verification just like a wrong password.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password(DUMMY_PASSWORD).ok());

/// Hash a password for storage.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check a submitted password against a stored hash.
///
/// A stored value that is not a valid PHC string never matches, so legacy
/// plain-text rows cannot be logged into.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
            false
        }
    }
}

/// Build the dummy hash up front instead of on the first failed login.
pub fn prepare_dummy_hash() {
    if DUMMY_HASH.is_none() {
        tracing::warn!("Could not build dummy password hash; unknown-email logins will answer faster");
    }
}

/// Spend a full verification on the dummy hash and report a mismatch.
pub fn verify_without_account(password: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("secret123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret123", &hash));
        assert!(!verify_password("secret124", &hash));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("secret123").unwrap();
        let b = hash_password("secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn plain_text_stored_value_never_matches() {
        assert!(!verify_password("secret123", "secret123"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn dummy_hash_is_a_real_argon2_hash() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(PasswordHash::new(hash).is_ok());
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn verifying_without_account_never_matches() {
        assert!(!verify_without_account("secret123"));
        assert!(!verify_without_account(DUMMY_PASSWORD));
    }
}
