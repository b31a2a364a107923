//! Startup imports

use sqlx::SqlitePool;
use warehouse_core::Config;

/// Run every import job before the listener binds. Failures are logged, never fatal.
pub async fn run_startup_imports(config: &Config, pool: &SqlitePool) {
    tracing::info!("IMPORT_ON_STARTUP set, importing all media kinds");
    let reports = warehouse_import::run_all(config, pool, None).await;
    for report in &reports {
        tracing::info!(
            kind = %report.kind,
            mode = %report.mode,
            scanned = report.scanned,
            imported = report.imported,
            failed = report.failed,
            "Startup import finished"
        );
    }
}
