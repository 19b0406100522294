//! v002: causal_edges with evidence blobs and tombstones.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS causal_edges (
            id           TEXT PRIMARY KEY,
            source_id    TEXT NOT NULL,
            target_id    TEXT NOT NULL,
            relation     TEXT NOT NULL,
            strength     REAL NOT NULL DEFAULT 0.5,
            evidence     TEXT NOT NULL DEFAULT '[]',
            created_at   TEXT NOT NULL,
            validated_at TEXT,
            inferred     INTEGER NOT NULL DEFAULT 0,
            created_by   TEXT,
            tombstone    INTEGER NOT NULL DEFAULT 0,
            UNIQUE (source_id, target_id, relation)
        );

        CREATE INDEX IF NOT EXISTS idx_causal_source ON causal_edges(source_id);
        CREATE INDEX IF NOT EXISTS idx_causal_target ON causal_edges(target_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
