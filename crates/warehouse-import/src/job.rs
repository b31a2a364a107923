//! The import loop: list a directory, extract each file, store each record, log failures.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

use warehouse_core::models::{NewImage, NewPdf, NewPresentation, NewTrack};
use warehouse_core::{AppError, MediaKind};
use warehouse_db::{ImageRepository, MusicRepository, PdfRepository, PresentationRepository};

use crate::extract::Extractor;

/// How existing rows are treated by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Delete every row, then insert
    Replace,
    /// Insert or update by the unique key
    Upsert,
}

impl ImportMode {
    pub fn default_for(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Image => ImportMode::Upsert,
            MediaKind::Music | MediaKind::Pdf | MediaKind::Presentation => ImportMode::Replace,
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportMode::Replace => f.write_str("replace"),
            ImportMode::Upsert => f.write_str("upsert"),
        }
    }
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(ImportMode::Replace),
            "upsert" => Ok(ImportMode::Upsert),
            other => Err(format!("Unknown import mode '{}' (use replace or upsert)", other)),
        }
    }
}

/// Outcome of one import run.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub kind: MediaKind,
    pub mode: ImportMode,
    /// Source files read
    pub scanned: usize,
    /// Rows stored
    pub imported: usize,
    /// Files or rows that could not be stored
    pub failed: usize,
    /// Error log appended to, when anything failed
    pub log_file: Option<PathBuf>,
}

/// Where extracted records end up.
#[async_trait]
pub trait RecordSink<R>: Send + Sync {
    async fn clear(&self) -> Result<u64, AppError>;
    async fn store(&self, record: &R) -> Result<i64, AppError>;
}

macro_rules! repository_sink {
    ($repo:ty, $record:ty) => {
        #[async_trait]
        impl RecordSink<$record> for $repo {
            async fn clear(&self) -> Result<u64, AppError> {
                self.delete_all().await
            }

            async fn store(&self, record: &$record) -> Result<i64, AppError> {
                self.upsert(record).await
            }
        }
    };
}

repository_sink!(ImageRepository, NewImage);
repository_sink!(MusicRepository, NewTrack);
repository_sink!(PdfRepository, NewPdf);
repository_sink!(PresentationRepository, NewPresentation);

/// Directory, allow-list and destinations of one run.
#[derive(Debug, Clone)]
pub struct JobSettings {
    pub dir: PathBuf,
    /// Lowercase extensions without the dot
    pub extensions: Vec<String>,
    pub mode: ImportMode,
    pub log_dir: PathBuf,
}

pub struct ImportJob<E, S> {
    extractor: E,
    sink: S,
    settings: JobSettings,
}

struct Failure {
    file: String,
    message: String,
}

pub fn log_file_path(log_dir: &Path, kind: MediaKind) -> PathBuf {
    log_dir.join(format!("{}_import_errors.log", kind))
}

/// Files directly inside `dir` whose extension is allowed, sorted by name.
pub fn list_sources(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let allowed = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)));
        if allowed {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

async fn write_error_log(path: &Path, failures: &[Failure]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut entry = format!(
        "--- Error log {} ---\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    for failure in failures {
        entry.push_str(&format!(
            " - File: {} | Error: {}\n",
            failure.file, failure.message
        ));
    }
    entry.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open error log {}", path.display()))?;
    file.write_all(entry.as_bytes())
        .await
        .with_context(|| format!("Failed to write error log {}", path.display()))?;
    Ok(())
}

impl<E, S> ImportJob<E, S>
where
    E: Extractor,
    S: RecordSink<E::Record>,
{
    pub fn new(extractor: E, sink: S, settings: JobSettings) -> Self {
        Self {
            extractor,
            sink,
            settings,
        }
    }

    async fn extract(&self, path: PathBuf) -> Result<crate::extract::Rows<E::Record>> {
        let extractor = self.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .context("Extraction task failed")?
    }

    /// Run to completion. Per-file failures are logged and counted; only an unreadable
    /// directory or a failed table reset aborts the run.
    #[tracing::instrument(skip(self), fields(kind = %self.extractor.kind(), mode = %self.settings.mode, dir = %self.settings.dir.display()))]
    pub async fn run(&self) -> Result<ImportReport> {
        let kind = self.extractor.kind();
        let sources = self
            .extractor
            .select_sources(list_sources(&self.settings.dir, &self.settings.extensions)?);

        if self.settings.mode == ImportMode::Replace {
            let removed = self
                .sink
                .clear()
                .await
                .with_context(|| format!("Failed to clear {} table", kind))?;
            tracing::debug!(removed, "Cleared existing rows");
        }

        let mut report = ImportReport {
            kind,
            mode: self.settings.mode,
            scanned: 0,
            imported: 0,
            failed: 0,
            log_file: None,
        };
        let mut failures = Vec::new();

        for path in sources {
            report.scanned += 1;
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let rows = match self.extract(path).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(file = %file, error = %format!("{:#}", e), "Import failed");
                    failures.push(Failure {
                        file,
                        message: format!("{:#}", e),
                    });
                    continue;
                }
            };

            for row in rows {
                let stored = match row {
                    Ok(record) => self.sink.store(&record).await.map_err(anyhow::Error::from),
                    Err(e) => Err(e),
                };
                match stored {
                    Ok(_) => report.imported += 1,
                    Err(e) => {
                        tracing::warn!(file = %file, error = %format!("{:#}", e), "Import failed");
                        failures.push(Failure {
                            file: file.clone(),
                            message: format!("{:#}", e),
                        });
                    }
                }
            }
        }

        report.failed = failures.len();
        if !failures.is_empty() {
            let path = log_file_path(&self.settings.log_dir, kind);
            write_error_log(&path, &failures).await?;
            report.log_file = Some(path);
        }

        tracing::info!(
            scanned = report.scanned,
            imported = report.imported,
            failed = report.failed,
            "Import finished"
        );
        Ok(report)
    }
}
