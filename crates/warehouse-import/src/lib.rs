//! Warehouse import jobs
//!
//! One job per media kind: list a directory, read each file's metadata with the matching
//! extractor, upsert one row per record and append failures to an error log.

pub mod extract;
pub mod job;
pub mod normalize;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

use warehouse_core::{Config, MediaKind};
use warehouse_db::{ImageRepository, MusicRepository, PdfRepository, PresentationRepository};

pub use extract::{
    Extractor, ImageExtractor, MusicExtractor, PdfExtractor, PresentationExtractor, Rows,
};
pub use job::{ImportJob, ImportMode, ImportReport, JobSettings, RecordSink};

/// Per-run overrides of the configured directory and the kind's default mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions<'a> {
    pub dir: Option<&'a Path>,
    pub mode: Option<ImportMode>,
}

fn settings(config: &Config, kind: MediaKind, options: ImportOptions<'_>) -> JobSettings {
    JobSettings {
        dir: options
            .dir
            .unwrap_or_else(|| config.import_dir(kind))
            .to_path_buf(),
        extensions: config.extensions(kind).to_vec(),
        mode: options.mode.unwrap_or_else(|| ImportMode::default_for(kind)),
        log_dir: config.import_log_dir().to_path_buf(),
    }
}

/// Run the import job for one media kind.
pub async fn run_kind(
    config: &Config,
    pool: &SqlitePool,
    kind: MediaKind,
    options: ImportOptions<'_>,
) -> Result<ImportReport> {
    let settings = settings(config, kind, options);
    tracing::info!(kind = %kind, dir = %settings.dir.display(), mode = %settings.mode, "Starting import");

    match kind {
        MediaKind::Image => {
            ImportJob::new(
                ImageExtractor::new(),
                ImageRepository::new(pool.clone()),
                settings,
            )
            .run()
            .await
        }
        MediaKind::Music => {
            ImportJob::new(
                MusicExtractor::new(),
                MusicRepository::new(pool.clone()),
                settings,
            )
            .run()
            .await
        }
        MediaKind::Pdf => {
            ImportJob::new(
                PdfExtractor::new()?,
                PdfRepository::new(pool.clone()),
                settings,
            )
            .run()
            .await
        }
        MediaKind::Presentation => {
            ImportJob::new(
                PresentationExtractor::new()?,
                PresentationRepository::new(pool.clone()),
                settings,
            )
            .run()
            .await
        }
    }
}

/// Run every import job in turn from the configured directories.
///
/// A kind whose job fails outright (missing directory, unreachable database) is logged and
/// skipped; the remaining kinds still run.
pub async fn run_all(config: &Config, pool: &SqlitePool, mode: Option<ImportMode>) -> Vec<ImportReport> {
    let mut reports = Vec::with_capacity(MediaKind::ALL.len());
    for kind in MediaKind::ALL {
        let options = ImportOptions { dir: None, mode };
        match run_kind(config, pool, kind, options).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(kind = %kind, error = %format!("{:#}", e), "Import job failed");
            }
        }
    }
    reports
}
