//! Store traits
//!
//! Handlers and the auth core talk to persistence only through these traits.
//! Every call acquires its own pooled connection and gives it back before
//! returning, on success and on error alike.

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{
    CredentialRecord, Meal, MealChanges, MealId, NewMeal, NewUser, UserChanges, UserId,
    UserProfile, UserSummary,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be obtained, or it dropped mid-query
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A unique constraint rejected the write
    #[error("duplicate value: {0}")]
    Conflict(String),

    /// A foreign key pointed at a row that no longer exists
    #[error("missing referenced row: {0}")]
    MissingReference(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// User accounts, including the credential lookup used by login.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All records whose email matches exactly. Callers treat anything other
    /// than a single record as "no such account".
    async fn find_credentials_by_email(&self, email: &str) -> Result<Vec<CredentialRecord>, StoreError>;

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError>;

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Returns `None` when no user has this id.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<UserProfile>, StoreError>;

    /// Returns `false` when no user has this id.
    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MealStore: Send + Sync {
    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, StoreError>;

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError>;

    async fn find_meal(&self, id: MealId) -> Result<Option<Meal>, StoreError>;

    /// The `cookId` of a meal, or `None` if the meal does not exist.
    async fn find_meal_owner(&self, id: MealId) -> Result<Option<UserId>, StoreError>;

    async fn update_meal(&self, id: MealId, changes: MealChanges) -> Result<Option<Meal>, StoreError>;

    async fn delete_meal(&self, id: MealId) -> Result<bool, StoreError>;
}
