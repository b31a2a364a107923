//! Warehouse Core Library
//!
//! Domain models, search field allow-lists, paging rules, error types and configuration
//! shared by the database, import and HTTP crates.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ImportConfig, WarehouseConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::MediaKind;
