//! The storage connection layout: exactly one writer, and for file-backed
//! stores a handful of readers beside it.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::Path;

use cortex_core::errors::CortexResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Readers opened alongside the writer for a file-backed store.
const READ_POOL_SIZE: usize = 4;

/// The connection set backing one store.
///
/// `readers` is `None` for in-memory databases: every in-memory connection
/// is its own database, so a separate reader would never see the writer's
/// rows. Reads route through the writer there.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: Option<ReadPool>,
}

impl ConnectionPool {
    /// Writer plus read pool over a database file.
    pub fn file_backed(path: &Path) -> CortexResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::new(path, READ_POOL_SIZE)?;
        Ok(Self {
            writer,
            readers: Some(readers),
        })
    }

    /// A single in-memory connection serving both roles.
    pub fn ephemeral() -> CortexResult<Self> {
        Ok(Self {
            writer: WriteConnection::open_in_memory()?,
            readers: None,
        })
    }
}
