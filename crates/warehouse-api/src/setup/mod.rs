//! Application setup and initialization

pub mod database;
pub mod import;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use warehouse_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.environment())?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;

    if config.import_on_startup() {
        import::run_startup_imports(&config, &pool).await;
    }

    let state = Arc::new(AppState::new(config.clone(), pool));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
