//! Metadata extractors, one per media kind.
//!
//! Extraction is synchronous and file-local: an extractor turns one path into zero or more
//! records and never touches the database. The import job runs it on the blocking pool.

use std::path::{Path, PathBuf};

use warehouse_core::MediaKind;

pub mod image;
pub mod music;
pub mod pdf;
pub mod presentation;

pub use image::ImageExtractor;
pub use music::MusicExtractor;
pub use pdf::PdfExtractor;
pub use presentation::PresentationExtractor;

/// Records read from one source file. A file can yield several rows (a catalogue), and a
/// single row can fail without failing its siblings.
pub type Rows<R> = Vec<anyhow::Result<R>>;

pub trait Extractor: Clone + Send + Sync + 'static {
    type Record: Send + 'static;

    fn kind(&self) -> MediaKind;

    /// Narrow the directory listing to the files this extractor reads.
    fn select_sources(&self, candidates: Vec<PathBuf>) -> Vec<PathBuf> {
        candidates
    }

    fn extract(&self, path: &Path) -> anyhow::Result<Rows<Self::Record>>;
}

/// File name component as an owned string.
pub(crate) fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("Path has no file name: {}", path.display()))
}
