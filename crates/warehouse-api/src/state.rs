//! Application state shared by every handler.

use sqlx::SqlitePool;
use warehouse_core::Config;
use warehouse_db::{ImageRepository, MusicRepository, PdfRepository, PresentationRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
    pub images: ImageRepository,
    pub music: MusicRepository,
    pub pdfs: PdfRepository,
    pub presentations: PresentationRepository,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self {
            images: ImageRepository::new(pool.clone()),
            music: MusicRepository::new(pool.clone()),
            pdfs: PdfRepository::new(pool.clone()),
            presentations: PresentationRepository::new(pool.clone()),
            config,
            pool,
        }
    }
}
