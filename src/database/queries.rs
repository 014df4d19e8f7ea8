// Postgres-backed store
//
// `UserStore` and `MealStore` on top of the deadpool connection pool. The pooled
// client is held only for the duration of one call and goes back to the pool
// when it is dropped.

use async_trait::async_trait;
use deadpool_postgres::PoolError;
use tokio_postgres::error::SqlState;

use crate::database::connection::DatabaseConnection;
use crate::database::models::{
    CredentialRecord, FromRow, Meal, MealChanges, MealId, NewMeal, NewUser, UserChanges, UserId,
    UserProfile, UserSummary,
};
use crate::database::store::{MealStore, StoreError, UserStore};

// Column lists as macros so statements can be built with `concat!`.
macro_rules! profile_columns {
    () => {
        "id, first_name, last_name, email_adress, is_active, street, city, phone_number, roles"
    };
}

macro_rules! meal_columns {
    () => {
        "id, name, description, price, date_time, max_amount_of_participants, image_url, \
         is_active, is_vega, is_vegan, is_to_take_home, allergenes, cook_id, create_date, update_date"
    };
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            StoreError::Conflict(err.to_string())
        } else if err.code() == Some(&SqlState::FOREIGN_KEY_VIOLATION) {
            StoreError::MissingReference(err.to_string())
        } else if err.is_closed() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Query(err.to_string())
        }
    }
}

fn rows_into<T: FromRow>(rows: &[tokio_postgres::Row]) -> Result<Vec<T>, StoreError> {
    rows.iter()
        .map(|row| T::from_row(row).map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl UserStore for DatabaseConnection {
    async fn find_credentials_by_email(&self, email: &str) -> Result<Vec<CredentialRecord>, StoreError> {
        let client = self.pool().get().await?;
        let rows = client
            .query(
                concat!("SELECT ", profile_columns!(), ", password_hash FROM users WHERE email_adress = $1"),
                &[&email],
            )
            .await?;
        rows_into(&rows)
    }

    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_one(
                concat!(
                    "INSERT INTO users (first_name, last_name, email_adress, password_hash, street, city, phone_number) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ", profile_columns!()
                ),
                &[
                    &user.first_name,
                    &user.last_name,
                    &user.email_adress,
                    &user.password_hash,
                    &user.street,
                    &user.city,
                    &user.phone_number,
                ],
            )
            .await?;
        Ok(UserProfile::from_row(&row)?)
    }

    async fn list_users(&self) -> Result<Vec<UserSummary>, StoreError> {
        let client = self.pool().get().await?;
        let rows = client
            .query("SELECT id, first_name, last_name FROM users ORDER BY id", &[])
            .await?;
        rows_into(&rows)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<UserProfile>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt(concat!("SELECT ", profile_columns!(), " FROM users WHERE id = $1"), &[&id])
            .await?;
        Ok(row.as_ref().map(UserProfile::from_row).transpose()?)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<Option<UserProfile>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt(
                concat!(
                    "UPDATE users SET \
                        first_name = COALESCE($2, first_name), \
                        last_name = COALESCE($3, last_name), \
                        email_adress = COALESCE($4, email_adress), \
                        password_hash = COALESCE($5, password_hash), \
                        is_active = COALESCE($6, is_active), \
                        street = COALESCE($7, street), \
                        city = COALESCE($8, city), \
                        phone_number = COALESCE($9, phone_number), \
                        updated_at = NOW() \
                     WHERE id = $1 RETURNING ", profile_columns!()
                ),
                &[
                    &id,
                    &changes.first_name,
                    &changes.last_name,
                    &changes.email_adress,
                    &changes.password_hash,
                    &changes.is_active,
                    &changes.street,
                    &changes.city,
                    &changes.phone_number,
                ],
            )
            .await?;
        Ok(row.as_ref().map(UserProfile::from_row).transpose()?)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, StoreError> {
        let client = self.pool().get().await?;
        let affected = client.execute("DELETE FROM users WHERE id = $1", &[&id]).await?;
        Ok(affected > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let client = self.pool().get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

#[async_trait]
impl MealStore for DatabaseConnection {
    async fn create_meal(&self, meal: NewMeal) -> Result<Meal, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_one(
                concat!(
                    "INSERT INTO meals (name, description, price, date_time, max_amount_of_participants, \
                        image_url, is_active, is_vega, is_vegan, is_to_take_home, allergenes, cook_id) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING ", meal_columns!()
                ),
                &[
                    &meal.name,
                    &meal.description,
                    &meal.price,
                    &meal.date_time,
                    &meal.max_amount_of_participants,
                    &meal.image_url,
                    &meal.is_active,
                    &meal.is_vega,
                    &meal.is_vegan,
                    &meal.is_to_take_home,
                    &meal.allergenes,
                    &meal.cook_id,
                ],
            )
            .await?;
        Ok(Meal::from_row(&row)?)
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        let client = self.pool().get().await?;
        let rows = client
            .query(concat!("SELECT ", meal_columns!(), " FROM meals ORDER BY id"), &[])
            .await?;
        rows_into(&rows)
    }

    async fn find_meal(&self, id: MealId) -> Result<Option<Meal>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt(concat!("SELECT ", meal_columns!(), " FROM meals WHERE id = $1"), &[&id])
            .await?;
        Ok(row.as_ref().map(Meal::from_row).transpose()?)
    }

    async fn find_meal_owner(&self, id: MealId) -> Result<Option<UserId>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt("SELECT cook_id FROM meals WHERE id = $1", &[&id])
            .await?;
        Ok(row.map(|r| r.try_get::<_, UserId>("cook_id")).transpose()?)
    }

    async fn update_meal(&self, id: MealId, changes: MealChanges) -> Result<Option<Meal>, StoreError> {
        let client = self.pool().get().await?;
        let row = client
            .query_opt(
                concat!(
                    "UPDATE meals SET \
                        name = COALESCE($2, name), \
                        description = COALESCE($3, description), \
                        price = COALESCE($4, price), \
                        date_time = COALESCE($5, date_time), \
                        max_amount_of_participants = COALESCE($6, max_amount_of_participants), \
                        image_url = COALESCE($7, image_url), \
                        is_active = COALESCE($8, is_active), \
                        is_vega = COALESCE($9, is_vega), \
                        is_vegan = COALESCE($10, is_vegan), \
                        is_to_take_home = COALESCE($11, is_to_take_home), \
                        allergenes = COALESCE($12, allergenes), \
                        update_date = NOW() \
                     WHERE id = $1 RETURNING ", meal_columns!()
                ),
                &[
                    &id,
                    &changes.name,
                    &changes.description,
                    &changes.price,
                    &changes.date_time,
                    &changes.max_amount_of_participants,
                    &changes.image_url,
                    &changes.is_active,
                    &changes.is_vega,
                    &changes.is_vegan,
                    &changes.is_to_take_home,
                    &changes.allergenes,
                ],
            )
            .await?;
        Ok(row.as_ref().map(Meal::from_row).transpose()?)
    }

    async fn delete_meal(&self, id: MealId) -> Result<bool, StoreError> {
        let client = self.pool().get().await?;
        let affected = client.execute("DELETE FROM meals WHERE id = $1", &[&id]).await?;
        Ok(affected > 0)
    }
}
