use clap::ValueEnum;
use std::path::{Path, PathBuf};
use warehouse_core::MediaKind;

/// Which collections an `import` command touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportTarget {
    Images,
    Music,
    Pdfs,
    Presentations,
    All,
}

impl ImportTarget {
    pub fn kinds(&self) -> Vec<MediaKind> {
        match self {
            ImportTarget::Images => vec![MediaKind::Image],
            ImportTarget::Music => vec![MediaKind::Music],
            ImportTarget::Pdfs => vec![MediaKind::Pdf],
            ImportTarget::Presentations => vec![MediaKind::Presentation],
            ImportTarget::All => MediaKind::ALL.to_vec(),
        }
    }
}

/// Directory override for one kind. With `all`, `--dir` names the base directory holding
/// one sub-directory per kind.
pub fn source_dir(target: ImportTarget, dir: Option<&Path>, kind: MediaKind) -> Option<PathBuf> {
    let dir = dir?;
    match target {
        ImportTarget::All => Some(dir.join(kind.default_dir_name())),
        _ => Some(dir.to_path_buf()),
    }
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
