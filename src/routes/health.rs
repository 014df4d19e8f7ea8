use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::errors::ApiError;
use crate::response::ApiResponse;
use crate::server::AppState;

/// Liveness endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/ping`
/// - **Response**: `{"status": "pong"}`
///
/// Does no I/O, so it answers even when the database is down. Use `/health`
/// for a check that includes the store.
pub async fn ping() -> Json<Value> {
    Json(json!({ "status": "pong" }))
}

/// Readiness endpoint handler.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/health`
///
/// # HTTP Status Codes
/// - **200 OK**: the store answered a trivial query
/// - **500 Internal Server Error**: no connection could be obtained
pub async fn health(State(app_state): State<AppState>) -> Result<ApiResponse<Value>, ApiError> {
    app_state.users.health_check().await?;
    Ok(ApiResponse::ok("Healthy", json!({ "database": "up" })))
}
