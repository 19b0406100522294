//! v004: sessions and their loaded-set rows.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sessions (
            id            TEXT PRIMARY KEY,
            started_at    TEXT NOT NULL,
            ended_at      TEXT,
            last_activity TEXT NOT NULL,
            tokens_sent   INTEGER NOT NULL DEFAULT 0,
            queries_made  INTEGER NOT NULL DEFAULT 0,
            metadata      TEXT
        );

        CREATE TABLE IF NOT EXISTS session_loaded (
            session_id        TEXT NOT NULL,
            kind              TEXT NOT NULL,
            target_id         TEXT NOT NULL,
            loaded_at         TEXT NOT NULL,
            token_count       INTEGER NOT NULL DEFAULT 0,
            compression_level INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (session_id, kind, target_id)
        );

        CREATE INDEX IF NOT EXISTS idx_session_loaded ON session_loaded(session_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
