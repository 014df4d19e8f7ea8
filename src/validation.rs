//! Request field validation for user and meal payloads.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ApiError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^06[- ]?[0-9]{8}$").expect("phone pattern compiles"));

/// A present, non-blank string field, or a 400 naming the field.
pub fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("Missing or incorrect {field} field"))),
    }
}

/// A present, non-empty string field, taken verbatim.
pub fn present<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ApiError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::Validation(format!("Missing or incorrect {field} field"))),
    }
}

pub fn email(value: &str) -> Result<(), ApiError> {
    if EMAIL_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::Validation("Invalid email address".to_string()))
    }
}

/// At least 8 ASCII letters/digits, with one of each.
pub fn password(value: &str) -> Result<(), ApiError> {
    let well_formed = value.len() >= 8
        && value.chars().all(|c| c.is_ascii_alphanumeric())
        && value.chars().any(|c| c.is_ascii_alphabetic())
        && value.chars().any(|c| c.is_ascii_digit());
    if well_formed {
        Ok(())
    } else {
        Err(ApiError::Validation("Invalid password".to_string()))
    }
}

/// Dutch mobile number: `06-12345678`, `06 12345678` or `0612345678`.
pub fn phone_number(value: &str) -> Result<(), ApiError> {
    if PHONE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ApiError::Validation("Invalid phone number".to_string()))
    }
}
