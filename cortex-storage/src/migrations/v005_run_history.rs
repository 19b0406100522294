//! v005: consolidation and validation run history.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS consolidation_runs (
            id         TEXT PRIMARY KEY,
            started_at TEXT NOT NULL,
            ended_at   TEXT NOT NULL,
            metrics    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS validation_runs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            memory_id   TEXT NOT NULL,
            at          TEXT NOT NULL,
            dimension   TEXT NOT NULL,
            severity    TEXT NOT NULL,
            description TEXT NOT NULL,
            healed_at   TEXT,
            actions     TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_validation_memory ON validation_runs(memory_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
