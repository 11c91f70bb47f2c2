//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows and validated inserts
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: `ViewerStorage`, the repository used by the handlers

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbScreenshot, NewScreenshot, RecordRef, ScreenshotTransform};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, ViewerStorage, connect};
