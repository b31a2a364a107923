//! Database repositories for data access layer
//!
//! Each repository owns one media table and exposes upsert, lookup, search and list
//! operations. Search SQL is assembled from [`query::Filter`] clause trees so user input
//! only ever reaches the database as bound parameters.
//
// Pool and migrations
pub mod pool;
//
// Typed clause list and SELECT rendering
pub mod query;
//
// One repository per media table
pub mod image;
pub mod music;
pub mod pdf;
pub mod presentation;

pub use image::ImageRepository;
pub use music::MusicRepository;
pub use pdf::PdfRepository;
pub use pool::{connect, in_memory_pool, run_migrations, MIGRATOR};
pub use presentation::PresentationRepository;
