//! Auth routes: password login

use axum::extract::State;

use crate::auth::models::{LoginRequest, LoginResponse};
use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::response::ApiResponse;
use crate::server::AppState;
use crate::validation;

/// `POST /api/login`
///
/// Body `{emailAdress, password}`. Answers 200 with the caller's profile and a
/// token in `data`, 400 when a field is missing and 401 when the credentials
/// do not match an account.
pub async fn login(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    // Neither field is trimmed; the email is matched exactly as stored
    let email = validation::present(&payload.email_adress, "emailAdress")?;
    let password = validation::present(&payload.password, "password")?;

    let response = app_state.auth_service.login(email, password).await?;
    Ok(ApiResponse::ok("User logged in", response))
}
