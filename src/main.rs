//! # Share-Meal Server
//!
//! HTTP API for users and the meals they cook, built with Axum, Tokio and
//! PostgreSQL.
//!
//! ## Features
//! - Password login (Argon2) issuing stateless HS256 bearer tokens
//! - Token and ownership middleware in front of user and meal mutations
//! - Structured logging with tracing
//! - Embedded database migrations
//!
//! ## Architecture
//! - `server`: router, shared state and startup
//! - `config`: environment configuration, built once at startup
//! - `auth`: token service, password verification, login, ownership guard, middleware
//! - `database`: connection pool, models, store traits and the Postgres store
//! - `routes`: HTTP handlers per resource
//!
//! ## Environment Setup
//! ```bash
//! cp .env.example .env
//! # Set JWT_SECRET and DATABASE_URL
//! ```
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! curl http://localhost:3000/ping
//! ```

mod auth;
mod config;
mod database;
mod errors;
mod extract;
mod response;
mod routes;
mod server;
mod validation;

use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt, EnvFilter };

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the variables may come from the environment
    dotenv::dotenv().ok();

    tracing_subscriber
        ::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt
                ::layer()
                .with_target(false)
                .compact()
        )
        .init();

    tracing::info!("🏁 Starting share-meal server...");
    tracing::info!("📦 Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("🏗️  Build profile: {}", if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    });

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {:#}", e);
            return Err(e);
        }
    };
    tracing::debug!("Database: {:?}", config.database);

    server::start(config).await
}
