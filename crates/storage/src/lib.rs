//! Storage Layer
//!
//! Append-only sensor reading log with a SQLite-backed store and an
//! in-memory store for tests and diskless operation.

mod memory;
mod reading;
mod sqlite;

pub use memory::MemoryStore;
pub use reading::{NewReading, ReadingStore, SensorReading};
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Store lock poisoned")]
    LockPoisoned,
}
