//! # cortex-storage
//!
//! SQLite persistence for the whole engine: memories with bitemporal
//! coordinates, link tables, causal edges, embeddings, sessions, and run
//! history. One write connection, a small read pool, WAL mode.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use cortex_core::errors::{CortexError, StorageError};

/// Wrap a SQLite failure message, classifying transient lock contention
/// separately so callers can retry.
pub(crate) fn to_storage_err(message: String) -> CortexError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("database is locked") || lower.contains("database is busy") {
        CortexError::StorageError(StorageError::Busy { message })
    } else {
        CortexError::StorageError(StorageError::Sqlite { message })
    }
}

pub(crate) fn to_serialization_err(message: String) -> CortexError {
    CortexError::StorageError(StorageError::Serialization { message })
}
