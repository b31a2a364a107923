//! Database setup and initialization

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::time::Duration;
use warehouse_core::Config;

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    tracing::info!("Connecting to database...");
    let pool = warehouse_db::connect(
        config.database_url(),
        config.db_max_connections(),
        Duration::from_secs(config.db_timeout_seconds()),
    )
    .await?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected successfully"
    );

    warehouse_db::run_migrations(&pool)
        .await
        .context("Database migrations failed")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
