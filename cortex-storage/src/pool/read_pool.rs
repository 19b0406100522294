//! Read-side connections. Under WAL they run concurrently with the writer;
//! the pool hands out slots round-robin so parallel readers rarely collide
//! on the same mutex.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::{Connection, OpenFlags};

use cortex_core::errors::CortexResult;

use super::pragmas;
use crate::to_storage_err;

/// A fixed set of read-only connections to one database file.
pub struct ReadPool {
    slots: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    /// Open `size` read-only connections to the given file.
    pub fn new(path: &Path, size: usize) -> CortexResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let slots = (0..size.max(1))
            .map(|_| {
                let conn = Connection::open_with_flags(path, flags)
                    .map_err(|e| to_storage_err(format!("open reader: {e}")))?;
                pragmas::configure_reader(&conn)?;
                Ok(Mutex::new(conn))
            })
            .collect::<CortexResult<Vec<_>>>()?;
        Ok(Self {
            slots,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Run a query closure on the next slot in rotation.
    pub fn read<F, T>(&self, f: F) -> CortexResult<T>
    where
        F: FnOnce(&Connection) -> CortexResult<T>,
    {
        let slot = self.cursor.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let conn = self.slots[slot]
            .lock()
            .map_err(|e| to_storage_err(format!("reader slot {slot} poisoned: {e}")))?;
        f(&conn)
    }

    /// Number of connections held.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
