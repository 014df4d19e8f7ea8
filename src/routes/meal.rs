//! Meal routes
//!
//! Every meal route needs a token. Update and delete additionally sit behind
//! the meal ownership layer, which has already confirmed the meal exists and
//! that the caller is its cook.

use axum::extract::State;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::models::AuthUser;
use crate::database::models::{Meal, MealChanges, NewMeal};
use crate::database::store::StoreError;
use crate::errors::ApiError;
use crate::extract::{ApiJson, PathId};
use crate::response::ApiResponse;
use crate::server::AppState;
use crate::validation;

/// Create and update share one shape; `cookId` is not accepted from clients.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub date_time: Option<DateTime<Utc>>,
    pub max_amount_of_participants: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub is_vega: Option<bool>,
    pub is_vegan: Option<bool>,
    pub is_to_take_home: Option<bool>,
    pub allergenes: Option<Vec<String>>,
}

impl MealRequest {
    fn check_ranges(&self) -> Result<(), ApiError> {
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(ApiError::Validation("price must not be negative".to_string()));
        }
        if self.max_amount_of_participants.is_some_and(|n| n < 1) {
            return Err(ApiError::Validation(
                "maxAmountOfParticipants must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn meal_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Meal with ID {id} not found"))
}

/// `POST /api/meal`: the caller becomes the cook
pub async fn create_meal(
    State(app_state): State<AppState>,
    auth_user: AuthUser,
    ApiJson(payload): ApiJson<MealRequest>,
) -> Result<ApiResponse<Meal>, ApiError> {
    payload.check_ranges()?;
    let name = validation::required(&payload.name, "name")?.to_string();
    let description = validation::required(&payload.description, "description")?.to_string();
    let price = payload
        .price
        .ok_or_else(|| ApiError::Validation("Missing or incorrect price field".to_string()))?;
    let date_time = payload
        .date_time
        .ok_or_else(|| ApiError::Validation("Missing or incorrect dateTime field".to_string()))?;
    let max_amount_of_participants = payload.max_amount_of_participants.ok_or_else(|| {
        ApiError::Validation("Missing or incorrect maxAmountOfParticipants field".to_string())
    })?;

    let new_meal = NewMeal {
        name,
        description,
        price,
        date_time,
        max_amount_of_participants,
        image_url: payload.image_url.unwrap_or_default(),
        is_active: payload.is_active.unwrap_or(false),
        is_vega: payload.is_vega.unwrap_or(false),
        is_vegan: payload.is_vegan.unwrap_or(false),
        is_to_take_home: payload.is_to_take_home.unwrap_or(true),
        allergenes: payload.allergenes.unwrap_or_default(),
        cook_id: auth_user.id,
    };

    // A token can outlive its account; the cook reference then fails
    let meal = app_state.meals.create_meal(new_meal).await.map_err(|e| match e {
        StoreError::MissingReference(_) => ApiError::NotFound("User not found".to_string()),
        other => other.into(),
    })?;
    tracing::info!("User {} created meal {}", auth_user.id, meal.id);
    Ok(ApiResponse::created(format!("Meal created with ID {}", meal.id), meal))
}

/// `GET /api/meal`
pub async fn list_meals(
    State(app_state): State<AppState>,
) -> Result<ApiResponse<Vec<Meal>>, ApiError> {
    let meals = app_state.meals.list_meals().await?;
    Ok(ApiResponse::ok(format!("Found {} meals.", meals.len()), meals))
}

/// `GET /api/meal/{mealId}`
pub async fn get_meal(
    State(app_state): State<AppState>,
    PathId(meal_id): PathId,
) -> Result<ApiResponse<Meal>, ApiError> {
    let meal = app_state
        .meals
        .find_meal(meal_id)
        .await?
        .ok_or_else(|| meal_not_found(meal_id))?;
    Ok(ApiResponse::ok("Meal found", meal))
}

/// `PUT /api/meal/{mealId}`
pub async fn update_meal(
    State(app_state): State<AppState>,
    PathId(meal_id): PathId,
    ApiJson(payload): ApiJson<MealRequest>,
) -> Result<ApiResponse<Meal>, ApiError> {
    payload.check_ranges()?;
    for (value, field) in [(&payload.name, "name"), (&payload.description, "description")] {
        if value.is_some() {
            validation::required(value, field)?;
        }
    }

    let changes = MealChanges {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        date_time: payload.date_time,
        max_amount_of_participants: payload.max_amount_of_participants,
        image_url: payload.image_url,
        is_active: payload.is_active,
        is_vega: payload.is_vega,
        is_vegan: payload.is_vegan,
        is_to_take_home: payload.is_to_take_home,
        allergenes: payload.allergenes,
    };

    // The meal can still vanish between the ownership check and here
    let meal = app_state
        .meals
        .update_meal(meal_id, changes)
        .await?
        .ok_or_else(|| meal_not_found(meal_id))?;

    tracing::info!("Updated meal {}", meal_id);
    Ok(ApiResponse::ok(format!("Meal with ID {meal_id} updated successfully"), meal))
}

/// `DELETE /api/meal/{mealId}`
pub async fn delete_meal(
    State(app_state): State<AppState>,
    PathId(meal_id): PathId,
) -> Result<ApiResponse<Value>, ApiError> {
    if !app_state.meals.delete_meal(meal_id).await? {
        return Err(meal_not_found(meal_id));
    }

    tracing::info!("Deleted meal {}", meal_id);
    Ok(ApiResponse::ok(
        format!("Meal with ID {meal_id} deleted successfully"),
        json!({ "id": meal_id }),
    ))
}
