//! User routes: registration, listing, profile, update and delete.
//!
//! Update and delete sit behind the user ownership layer, so by the time the
//! handler runs the caller is known to be the user in the path.

use axum::extract::State;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::models::AuthUser;
use crate::auth::password;
use crate::database::models::{NewUser, UserChanges, UserProfile, UserSummary};
use crate::database::store::StoreError;
use crate::errors::ApiError;
use crate::extract::{ApiJson, PathId};
use crate::response::ApiResponse;
use crate::server::AppState;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_adress: Option<String>,
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_adress: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub phone_number: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
}

fn hash(password: &str) -> Result<String, ApiError> {
    password::hash_password(password).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::Internal
    })
}

fn email_conflict(err: StoreError, email: &str) -> ApiError {
    match err {
        StoreError::Conflict(_) => ApiError::Conflict(format!("User with email {email} already exists")),
        other => other.into(),
    }
}

fn user_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("User with ID {id} not found"))
}

/// `POST /api/user`
pub async fn create_user(
    State(app_state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterUserRequest>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let first_name = validation::required(&payload.first_name, "firstName")?;
    let last_name = validation::required(&payload.last_name, "lastName")?;
    // Email and phone are checked and stored exactly as sent; login does not trim either
    let email_adress = validation::present(&payload.email_adress, "emailAdress")?;
    let password = validation::present(&payload.password, "password")?;
    let phone_number = validation::present(&payload.phone_number, "phoneNumber")?;
    let street = validation::required(&payload.street, "street")?;
    let city = validation::required(&payload.city, "city")?;

    validation::email(email_adress)?;
    validation::password(password)?;
    validation::phone_number(phone_number)?;

    let new_user = NewUser {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email_adress: email_adress.to_string(),
        password_hash: hash(password)?,
        street: street.to_string(),
        city: city.to_string(),
        phone_number: phone_number.to_string(),
    };

    let user = app_state
        .users
        .create_user(new_user)
        .await
        .map_err(|e| email_conflict(e, email_adress))?;

    tracing::info!("Created user {}", user.id);
    Ok(ApiResponse::created(format!("User created with ID {}", user.id), user))
}

/// `GET /api/user`
pub async fn list_users(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<UserSummary>>, ApiError> {
    let users = app_state.users.list_users().await?;
    Ok(ApiResponse::ok(format!("Found {} users.", users.len()), users))
}

/// `GET /api/user/profile`: the caller's own account
pub async fn get_profile(
    State(app_state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    // A token outlives the account it was issued for
    let user = app_state
        .users
        .find_user(auth_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ApiResponse::ok("User profile retrieved successfully", user))
}

/// `GET /api/user/{userId}`
pub async fn get_user(
    State(app_state): State<AppState>,
    PathId(user_id): PathId,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let user = app_state
        .users
        .find_user(user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    Ok(ApiResponse::ok("User found", user))
}

/// `PUT /api/user/{userId}`
pub async fn update_user(
    State(app_state): State<AppState>,
    PathId(user_id): PathId,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<ApiResponse<UserProfile>, ApiError> {
    let email_adress = validation::present(&payload.email_adress, "emailAdress")?.to_string();
    validation::email(&email_adress)?;
    if let Some(phone) = payload.phone_number.as_deref() {
        validation::phone_number(phone)?;
    }
    let password_hash = match payload.password.as_deref() {
        Some(password) => {
            validation::password(password)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email_adress: Some(email_adress.clone()),
        password_hash,
        is_active: payload.is_active,
        street: payload.street,
        city: payload.city,
        phone_number: payload.phone_number,
    };

    let user = app_state
        .users
        .update_user(user_id, changes)
        .await
        .map_err(|e| email_conflict(e, &email_adress))?
        .ok_or_else(|| user_not_found(user_id))?;

    tracing::info!("Updated user {}", user_id);
    Ok(ApiResponse::ok(format!("User with ID {user_id} updated successfully"), user))
}

/// `DELETE /api/user/{userId}`
pub async fn delete_user(
    State(app_state): State<AppState>,
    PathId(user_id): PathId,
) -> Result<ApiResponse<Value>, ApiError> {
    if !app_state.users.delete_user(user_id).await? {
        return Err(user_not_found(user_id));
    }

    tracing::info!("Deleted user {}", user_id);
    Ok(ApiResponse::ok(
        format!("User with ID {user_id} deleted successfully"),
        json!({ "id": user_id }),
    ))
}
