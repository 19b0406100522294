//! Space reclamation.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

/// Full VACUUM followed by a WAL checkpoint.
pub fn full_vacuum(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch("VACUUM; PRAGMA wal_checkpoint(TRUNCATE);")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
