//! Authentication Middleware
//!
//! Axum middleware for bearer token validation and resource ownership.
//!
//! A protected request moves from unauthenticated to authenticated in
//! `validate_token`, and from authenticated to authorized in one of the
//! ownership layers. Any failure ends the request with the matching
//! `AuthError`; nothing is retried.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::auth::{errors::AuthError, guard, jwt::JwtService, models::AuthUser};
use crate::errors::ApiError;
use crate::extract::PathId;
use crate::server::AppState;

const BEARER_SCHEME: &str = "Bearer";

/// Pull the token out of an `Authorization` header value.
///
/// The scheme is matched by name, not by offset, so `Bearer`, `bearer` and
/// `Bearer   tok` all work while `Basic tok` or `Bearertok` do not.
pub fn bearer_token(header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = header
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?
        .trim();
    if value.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let (scheme, token) = value
        .split_once(char::is_whitespace)
        .unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return Err(AuthError::InvalidToken);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// Authentication middleware that validates tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Middleware function for validating bearer tokens
    pub async fn validate_token(
        State(jwt_service): State<Arc<JwtService>>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        let user_id = bearer_token(req.headers().get(header::AUTHORIZATION))
            .and_then(|token| jwt_service.verify(token))
            .inspect_err(|e| {
                tracing::warn!("[AuthMiddleware] {} {} rejected: {}", req.method(), req.uri(), e);
            })?;

        tracing::debug!("[AuthMiddleware] Authenticated user {}", user_id);
        req.extensions_mut().insert(AuthUser { id: user_id });

        Ok(next.run(req).await)
    }

    /// Only the user named in `/api/user/{userId}` may pass.
    pub async fn require_user_owner(
        auth_user: AuthUser,
        PathId(user_id): PathId,
        req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        guard::authorize(auth_user.id, user_id)
            .into_result()
            .inspect_err(|_| {
                tracing::warn!("Unauthorized access: user {} acting on user {}", auth_user.id, user_id);
            })?;

        Ok(next.run(req).await)
    }

    /// Only the cook of the meal in `/api/meal/{mealId}` may pass.
    pub async fn require_meal_owner(
        State(state): State<AppState>,
        auth_user: AuthUser,
        PathId(meal_id): PathId,
        req: Request,
        next: Next,
    ) -> Result<Response, ApiError> {
        guard::authorize_meal(state.meals.as_ref(), auth_user.id, meal_id).await?;

        Ok(next.run(req).await)
    }
}

/// Handlers behind `validate_token` take the caller's identity as an argument.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(ApiError::Auth(AuthError::MissingToken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<&str, AuthError> {
        // Leak keeps the borrow simple in tests
        let value: &'static HeaderValue = Box::leak(Box::new(HeaderValue::from_str(raw).unwrap()));
        bearer_token(Some(value))
    }

    #[test]
    fn missing_header_is_missing_token() {
        assert_eq!(bearer_token(None), Err(AuthError::MissingToken));
    }

    #[test]
    fn extracts_token_after_scheme() {
        assert_eq!(parse("Bearer abc.def.ghi"), Ok("abc.def.ghi"));
        assert_eq!(parse("bearer abc.def.ghi"), Ok("abc.def.ghi"));
        assert_eq!(parse("Bearer    abc.def.ghi  "), Ok("abc.def.ghi"));
    }

    #[test]
    fn empty_token_is_missing() {
        assert_eq!(parse(""), Err(AuthError::MissingToken));
        assert_eq!(parse("Bearer"), Err(AuthError::MissingToken));
        assert_eq!(parse("Bearer   "), Err(AuthError::MissingToken));
    }

    #[test]
    fn other_schemes_and_short_headers_are_invalid() {
        assert_eq!(parse("Basic dXNlcjpwYXNz"), Err(AuthError::InvalidToken));
        assert_eq!(parse("Bearerabc.def.ghi"), Err(AuthError::InvalidToken));
        assert_eq!(parse("abc"), Err(AuthError::InvalidToken));
    }
}
