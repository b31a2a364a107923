//! Warehouse database layer
//!
//! SQLite pool setup, embedded migrations, the typed clause builder and one repository
//! per media table.

pub mod db;

pub use db::*;
