//! Ownership checks for mutating user and meal resources.
//!
//! Only ever called with an identity that already came out of `JwtService::verify`.

use crate::auth::errors::AuthError;
use crate::database::models::{MealId, UserId};
use crate::database::store::MealStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

impl Access {
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Access::Allow => Ok(()),
            Access::Deny => Err(AuthError::OwnershipMismatch),
        }
    }
}

/// Allow iff the caller is the owner.
pub fn authorize(requester: UserId, owner: UserId) -> Access {
    if requester == owner {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// Look up a meal's cook and compare it with the caller. A missing meal is
/// reported as `ResourceNotFound`, never as a mismatch.
pub async fn authorize_meal(
    meals: &dyn MealStore,
    requester: UserId,
    meal_id: MealId,
) -> Result<(), AuthError> {
    let owner = meals
        .find_meal_owner(meal_id)
        .await
        .map_err(|e| {
            tracing::error!("Meal owner lookup failed for meal {}: {}", meal_id, e);
            AuthError::StoreUnavailable
        })?
        .ok_or_else(|| AuthError::ResourceNotFound(format!("Meal with ID {meal_id}")))?;

    authorize(requester, owner).into_result().inspect_err(|_| {
        tracing::warn!("User {} is not the cook of meal {} (cook {})", requester, meal_id, owner);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    #[test]
    fn same_identity_is_allowed() {
        for id in [0, 1, 7, i64::MAX] {
            assert_eq!(authorize(id, id), Access::Allow);
        }
    }

    #[test]
    fn different_identity_is_denied() {
        for (u, v) in [(5, 7), (7, 5), (1, 0), (-1, 1)] {
            assert_eq!(authorize(u, v), Access::Deny);
            assert_eq!(authorize(u, v).into_result(), Err(AuthError::OwnershipMismatch));
        }
    }

    #[tokio::test]
    async fn meal_cook_is_allowed() {
        let store = MemoryStore::new();
        store.seed_meal(10, 3).await;
        assert_eq!(authorize_meal(&store, 3, 10).await, Ok(()));
    }

    #[tokio::test]
    async fn other_user_is_denied_meal() {
        let store = MemoryStore::new();
        store.seed_meal(10, 3).await;
        assert_eq!(authorize_meal(&store, 4, 10).await, Err(AuthError::OwnershipMismatch));
    }

    #[tokio::test]
    async fn missing_meal_is_not_found_rather_than_denied() {
        let store = MemoryStore::new();
        assert!(matches!(
            authorize_meal(&store, 3, 99).await,
            Err(AuthError::ResourceNotFound(_))
        ));
    }

    #[tokio::test]
    async fn store_failure_is_reported_as_unavailable() {
        let store = MemoryStore::new();
        store.seed_meal(10, 3).await;
        store.set_offline(true);
        assert_eq!(authorize_meal(&store, 3, 10).await, Err(AuthError::StoreUnavailable));
    }
}
