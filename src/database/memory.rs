//! In-memory store used by unit and HTTP tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::auth::password;
use crate::database::models::{
    CredentialRecord, Meal, MealChanges, MealId, NewMeal, NewUser, UserChanges, UserId,
    UserProfile, UserSummary,
};
use crate::database::store::{MealStore, StoreError, UserStore};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<UserId, CredentialRecord>>,
    meals: RwLock<BTreeMap<MealId, Meal>>,
    next_user_id: AtomicI64,
    next_meal_id: AtomicI64,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    /// Insert a user with a fixed id and an argon2 hash of `password`.
    pub async fn seed_user(&self, id: UserId, email: &str, password: &str) -> UserProfile {
        let profile = UserProfile {
            id,
            first_name: "Test".to_string(),
            last_name: format!("User{id}"),
            email_adress: email.to_string(),
            is_active: true,
            street: "Lovensdijkstraat 61".to_string(),
            city: "Breda".to_string(),
            phone_number: "06-12345678".to_string(),
            roles: String::new(),
        };
        let record = CredentialRecord {
            profile: profile.clone(),
            password_hash: password::hash_password(password).expect("hash test password"),
        };
        self.users.write().await.insert(id, record);
        self.next_user_id.fetch_max(id, Ordering::SeqCst);
        profile
    }

    /// Insert a raw credential record, bypassing the email uniqueness check.
    pub async fn seed_record(&self, record: CredentialRecord) {
        self.next_user_id.fetch_max(record.id(), Ordering::SeqCst);
        self.users.write().await.insert(record.id(), record);
    }

    pub async fn seed_meal(&self, id: MealId, cook_id: UserId) -> Meal {
        let now = Utc::now();
        let meal = Meal {
            id,
            name: format!("Meal {id}"),
            description: "Pasta with pesto".to_string(),
            price: rust_decimal::Decimal::new(650, 2),
            date_time: now,
            max_amount_of_participants: 6,
            image_url: String::new(),
            is_active: true,
            is_vega: true,
            is_vegan: false,
            is_to_take_home: true,
            allergenes: vec!["gluten".to_string()],
            cook_id,
            create_date: now,
            update_date: now,
        };
        self.meals.write().await.insert(id, meal.clone());
        self.next_meal_id.fetch_max(id, Ordering::SeqCst);
        meal
    }

    fn email_taken(users: &BTreeMap<UserId, CredentialRecord>, email: &str, except: Option<UserId>) -> bool {
        users
            .values()
            .any(|r| r.profile.email_adress == email && Some(r.id()) != except)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_credentials_by_email(&self, email: &str) -> Result<Vec<CredentialRecord>, StoreError> {
        self.check_online()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|r| r.profile.email_adress == email)
            .cloned()
            .collect())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        self.check_online()?;
        let mut users = self.users.write().await;
        if Self::email_taken(&users, &user.email_adress, None) {
            return Err(StoreError::Conflict(user.email_adress));
        }
        let id = self.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
        let profile = UserProfile {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email_adress: user.email_adress,
            is_active: true,
            street: user.street,
            city: user.city,
            phone_number: user.phone_number,
            roles: String::new(),
        };
        users.insert(id, CredentialRecord { profile: profile.clone(), password_hash: user.password_hash });
        Ok(profile)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        self.check_online()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .map(|r| UserSummary {
                id: r.id(),
                first_name: r.profile.first_name.clone(),
                last_name: r.profile.last_name.clone(),
            })
            .collect())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        self.check_online()?;
        Ok(self.users.read().await.get(&id).map(|r| r.profile.clone()))
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<UserProfile>, StoreError> {
        self.check_online()?;
        let mut users = self.users.write().await;
        // Missing row wins over a conflicting email, as with the UPDATE in Postgres
        if !users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email_adress {
            if Self::email_taken(&users, email, Some(id)) {
                return Err(StoreError::Conflict(email.clone()));
            }
        }
        let Some(record) = users.get_mut(&id) else {
            return Ok(None);
        };
        let profile = &mut record.profile;
        if let Some(v) = changes.first_name { profile.first_name = v; }
        if let Some(v) = changes.last_name { profile.last_name = v; }
        if let Some(v) = changes.email_adress { profile.email_adress = v; }
        if let Some(v) = changes.is_active { profile.is_active = v; }
        if let Some(v) = changes.street { profile.street = v; }
        if let Some(v) = changes.city { profile.city = v; }
        if let Some(v) = changes.phone_number { profile.phone_number = v; }
        if let Some(v) = changes.password_hash { record.password_hash = v; }
        Ok(Some(record.profile.clone()))
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        self.check_online()?;
        let removed = self.users.write().await.remove(&id).is_some();
        if removed {
            self.meals.write().await.retain(|_, meal| meal.cook_id != id);
        }
        Ok(removed)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.check_online()
    }
}

#[async_trait]
impl MealStore for MemoryStore {
    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, StoreError> {
        self.check_online()?;
        if !self.users.read().await.contains_key(&meal.cook_id) {
            return Err(StoreError::MissingReference(format!("cook {}", meal.cook_id)));
        }
        let id = self.next_meal_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let created = Meal {
            id,
            name: meal.name,
            description: meal.description,
            price: meal.price,
            date_time: meal.date_time,
            max_amount_of_participants: meal.max_amount_of_participants,
            image_url: meal.image_url,
            is_active: meal.is_active,
            is_vega: meal.is_vega,
            is_vegan: meal.is_vegan,
            is_to_take_home: meal.is_to_take_home,
            allergenes: meal.allergenes,
            cook_id: meal.cook_id,
            create_date: now,
            update_date: now,
        };
        self.meals.write().await.insert(id, created.clone());
        Ok(created)
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        self.check_online()?;
        Ok(self.meals.read().await.values().cloned().collect())
    }

    async fn find_meal(&self, id: MealId) -> Result<Option<Meal>, StoreError> {
        self.check_online()?;
        Ok(self.meals.read().await.get(&id).cloned())
    }

    async fn find_meal_owner(&self, id: MealId) -> Result<Option<UserId>, StoreError> {
        self.check_online()?;
        Ok(self.meals.read().await.get(&id).map(|m| m.cook_id))
    }

    async fn update_meal(&self, id: MealId, changes: MealChanges) -> Result<Option<Meal>, StoreError> {
        self.check_online()?;
        let mut meals = self.meals.write().await;
        let Some(meal) = meals.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.name { meal.name = v; }
        if let Some(v) = changes.description { meal.description = v; }
        if let Some(v) = changes.price { meal.price = v; }
        if let Some(v) = changes.date_time { meal.date_time = v; }
        if let Some(v) = changes.max_amount_of_participants { meal.max_amount_of_participants = v; }
        if let Some(v) = changes.image_url { meal.image_url = v; }
        if let Some(v) = changes.is_active { meal.is_active = v; }
        if let Some(v) = changes.is_vega { meal.is_vega = v; }
        if let Some(v) = changes.is_vegan { meal.is_vegan = v; }
        if let Some(v) = changes.is_to_take_home { meal.is_to_take_home = v; }
        if let Some(v) = changes.allergenes { meal.allergenes = v; }
        meal.update_date = Utc::now();
        Ok(Some(meal.clone()))
    }

    async fn delete_meal(&self, id: MealId) -> Result<bool, StoreError> {
        self.check_online()?;
        Ok(self.meals.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename_to(email: &str) -> UserChanges {
        UserChanges {
            email_adress: Some(email.to_string()),
            ..UserChanges::default()
        }
    }

    #[tokio::test]
    async fn update_of_missing_user_is_none_before_any_conflict() {
        let store = MemoryStore::new();
        store.seed_user(1, "taken@b.com", "secret123").await;

        assert!(store.update_user(9, rename_to("taken@b.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_to_taken_email_conflicts() {
        let store = MemoryStore::new();
        store.seed_user(1, "taken@b.com", "secret123").await;
        store.seed_user(2, "free@b.com", "secret123").await;

        assert!(matches!(
            store.update_user(2, rename_to("taken@b.com")).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
