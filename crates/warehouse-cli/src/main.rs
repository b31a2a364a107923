//! Warehouse CLI: run metadata import jobs against the configured database.
//!
//! Reads the same environment (and `.env`) as the API server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use warehouse_cli::{init_tracing, source_dir, ImportTarget};
use warehouse_core::Config;
use warehouse_import::{ImportMode, ImportOptions};

#[derive(Parser)]
#[command(name = "warehouse", about = "Media metadata warehouse tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import metadata for one collection, or all of them
    Import {
        #[arg(value_enum)]
        target: ImportTarget,
        /// Read from this directory instead of the configured one
        #[arg(long)]
        dir: Option<PathBuf>,
        /// replace or upsert (default depends on the collection)
        #[arg(long)]
        mode: Option<ImportMode>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config
        .validate()
        .context("Configuration validation failed")?;

    match cli.command {
        Commands::Import { target, dir, mode } => {
            let pool = warehouse_db::connect(
                config.database_url(),
                config.db_max_connections(),
                Duration::from_secs(config.db_timeout_seconds()),
            )
            .await?;
            warehouse_db::run_migrations(&pool).await?;

            let mut reports = Vec::new();
            let mut failures = 0;
            for kind in target.kinds() {
                let dir = source_dir(target, dir.as_deref(), kind);
                let options = ImportOptions {
                    dir: dir.as_deref(),
                    mode,
                };
                match warehouse_import::run_kind(&config, &pool, kind, options).await {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        tracing::error!(kind = %kind, error = %format!("{:#}", e), "Import job failed");
                        failures += 1;
                    }
                }
            }

            let out = serde_json::to_string_pretty(&reports).context("Serialize import reports")?;
            println!("{}", out);

            pool.close().await;
            if failures > 0 {
                anyhow::bail!("{} import job(s) failed", failures);
            }
        }
    }

    Ok(())
}
