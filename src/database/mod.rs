//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres with a deadpool connection pool.
//! Includes connection management, models, store traits and migrations.

pub mod connection;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use connection::DatabaseConnection;
pub use store::{MealStore, StoreError, UserStore};
