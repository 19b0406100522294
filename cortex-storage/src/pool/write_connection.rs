//! The single writer. All mutations serialize through this connection;
//! transient lock contention is retried with bounded backoff.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use super::pragmas;
use crate::to_storage_err;

/// Maximum attempts for a busy write before surfacing the error.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Base backoff between attempts; doubles each retry.
const BACKOFF_BASE: Duration = Duration::from_millis(10);

/// The exclusive write connection, guarded by a mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open the writer for a database file.
    pub fn open(path: &Path) -> CortexResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::configure_writer(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory writer (for testing and ephemeral hosts).
    pub fn open_in_memory() -> CortexResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        pragmas::configure_writer(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure on the writer, once. The lock is held for the
    /// closure's duration and released on every exit path.
    pub fn with_conn_sync<F, T>(&self, f: F) -> CortexResult<T>
    where
        F: FnOnce(&Connection) -> CortexResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write lock poisoned: {e}")))?;
        f(&guard)
    }

    /// Execute a re-runnable closure, retrying on transient busy errors.
    /// Backs off exponentially, at most `MAX_WRITE_ATTEMPTS` attempts, then
    /// propagates the original error.
    pub fn with_conn_retry<F, T>(&self, f: F) -> CortexResult<T>
    where
        F: Fn(&Connection) -> CortexResult<T>,
    {
        let mut backoff = BACKOFF_BASE;
        let mut attempt = 1;
        loop {
            let result = self.with_conn_sync(&f);
            match result {
                Err(ref e) if e.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(attempt, "write busy, backing off");
                    std::thread::sleep(backoff);
                    backoff *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
