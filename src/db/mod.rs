//! Relational persistence for the two entity kinds the portal tracks:
//! labeling accounts and uploaded images.
//!
//! Layout:
//! - `models.rs`: row structs and the label state enum
//! - `schema.rs`: SQL DDL executed at startup (SQLite-first)
//! - `sqlite.rs`: pool setup and all queries

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{ImageRecord, Label, Operator};
pub use schema::SQLITE_INIT;
pub use sqlite::{connect, PortalStorage, SqlitePool};
