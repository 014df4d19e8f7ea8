//! Database Migrations
//!
//! Embedded refinery migrations for tokio-postgres. The SQL files live in
//! `migrations/` at the crate root.

use anyhow::{Context, Result};
use deadpool_postgres::Pool;
use std::ops::DerefMut;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Run all pending migrations
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    tracing::info!("🔄 Running database migrations...");

    let mut conn = pool.get().await.context("Failed to get connection for migrations")?;
    let client = conn.deref_mut().deref_mut();

    let report = embedded::migrations::runner()
        .run_async(client)
        .await
        .context("Failed to apply database migrations")?;

    for migration in report.applied_migrations() {
        tracing::info!("Applied migration {}", migration);
    }
    tracing::info!("✅ Database migrations completed successfully");
    Ok(())
}
