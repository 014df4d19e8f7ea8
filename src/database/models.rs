// Database Models
//
// Tokio-postgres compatible models for users and meals. JSON field names follow
// the public API (`emailAdress`, `cookId`, ...), column names are snake_case.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Identity of a user account. Assigned by the store, never changes.
pub type UserId = i64;

pub type MealId = i64;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> where Self: Sized;
}

// ============================================================================
// USER MODELS
// ============================================================================

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_adress: String,
    pub is_active: bool,
    pub street: String,
    pub city: String,
    pub phone_number: String,
    pub roles: String,
}

impl FromRow for UserProfile {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email_adress: row.try_get("email_adress")?,
            is_active: row.try_get("is_active")?,
            street: row.try_get("street")?,
            city: row.try_get("city")?,
            phone_number: row.try_get("phone_number")?,
            roles: row.try_get("roles")?,
        })
    }
}

/// Stored credentials for one account, as returned by an email lookup.
#[derive(Clone)]
pub struct CredentialRecord {
    pub profile: UserProfile,
    pub password_hash: String,
}

impl CredentialRecord {
    pub fn id(&self) -> UserId {
        self.profile.id
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

impl FromRow for CredentialRecord {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            profile: UserProfile::from_row(row)?,
            password_hash: row.try_get("password_hash")?,
        })
    }
}

/// Listing entry for `GET /api/user`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
}

impl FromRow for UserSummary {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
        })
    }
}

/// A validated registration with the password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email_adress: String,
    pub password_hash: String,
    pub street: String,
    pub city: String,
    pub phone_number: String,
}

/// Partial user update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_adress: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub phone_number: Option<String>,
}

// ============================================================================
// MEAL MODELS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub date_time: DateTime<Utc>,
    pub max_amount_of_participants: i32,
    pub image_url: String,
    pub is_active: bool,
    pub is_vega: bool,
    pub is_vegan: bool,
    pub is_to_take_home: bool,
    pub allergenes: Vec<String>,
    /// Owner of the meal
    pub cook_id: UserId,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

impl FromRow for Meal {
    fn from_row(row: &Row) -> Result<Self, tokio_postgres::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            date_time: row.try_get("date_time")?,
            max_amount_of_participants: row.try_get("max_amount_of_participants")?,
            image_url: row.try_get("image_url")?,
            is_active: row.try_get("is_active")?,
            is_vega: row.try_get("is_vega")?,
            is_vegan: row.try_get("is_vegan")?,
            is_to_take_home: row.try_get("is_to_take_home")?,
            allergenes: row.try_get("allergenes")?,
            cook_id: row.try_get("cook_id")?,
            create_date: row.try_get("create_date")?,
            update_date: row.try_get("update_date")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewMeal {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub date_time: DateTime<Utc>,
    pub max_amount_of_participants: i32,
    pub image_url: String,
    pub is_active: bool,
    pub is_vega: bool,
    pub is_vegan: bool,
    pub is_to_take_home: bool,
    pub allergenes: Vec<String>,
    pub cook_id: UserId,
}

/// Partial meal update. The owner is not updatable.
#[derive(Debug, Clone, Default)]
pub struct MealChanges {
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
