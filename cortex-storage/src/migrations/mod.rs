//! Versioned schema migrations. `run_migrations` applies every migration
//! above the recorded user_version, in order, each in its own transaction.

mod v001_memories;
mod v002_causal_tables;
mod v003_embeddings;
mod v004_sessions;
mod v005_run_history;

use rusqlite::Connection;

use cortex_core::errors::{CortexError, CortexResult, StorageError};

use crate::to_storage_err;

type Migration = (u32, fn(&Connection) -> CortexResult<()>);

const MIGRATIONS: &[Migration] = &[
    (1, v001_memories::migrate),
    (2, v002_causal_tables::migrate),
    (3, v003_embeddings::migrate),
    (4, v004_sessions::migrate),
    (5, v005_run_history::migrate),
];

/// Apply all pending migrations.
pub fn run_migrations(conn: &Connection) -> CortexResult<()> {
    let current: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            CortexError::StorageError(StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.pragma_update(None, "user_version", version)
            .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::debug!(version, "applied migration");
    }
    Ok(())
}

/// Current schema version of a connection.
pub fn schema_version(conn: &Connection) -> CortexResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}
