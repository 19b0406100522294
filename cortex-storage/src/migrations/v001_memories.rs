//! v001: memories, link tables, relationship table, FTS index.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id               TEXT PRIMARY KEY,
            memory_type      TEXT NOT NULL,
            content          TEXT NOT NULL,
            summary          TEXT NOT NULL,
            confidence       REAL NOT NULL,
            importance       TEXT NOT NULL,
            transaction_time TEXT NOT NULL,
            valid_time       TEXT NOT NULL,
            valid_until      TEXT,
            created_at       TEXT NOT NULL,
            updated_at       TEXT NOT NULL,
            last_accessed    TEXT NOT NULL,
            last_validated   TEXT,
            access_count     INTEGER NOT NULL DEFAULT 0,
            created_by       TEXT,
            tags             TEXT NOT NULL DEFAULT '[]',
            archived         INTEGER NOT NULL DEFAULT 0,
            archive_reason   TEXT,
            superseded_by    TEXT,
            supersedes       TEXT,
            content_hash     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_memories_type ON memories(memory_type);
        CREATE INDEX IF NOT EXISTS idx_memories_confidence ON memories(confidence);
        CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);
        CREATE INDEX IF NOT EXISTS idx_memories_archived ON memories(archived);

        CREATE TABLE IF NOT EXISTS memory_patterns (
            memory_id    TEXT NOT NULL,
            pattern_id   TEXT NOT NULL,
            pattern_name TEXT,
            PRIMARY KEY (memory_id, pattern_id)
        );

        CREATE TABLE IF NOT EXISTS memory_constraints (
            memory_id       TEXT NOT NULL,
            constraint_id   TEXT NOT NULL,
            constraint_name TEXT,
            PRIMARY KEY (memory_id, constraint_id)
        );

        CREATE TABLE IF NOT EXISTS memory_files (
            memory_id    TEXT NOT NULL,
            file_path    TEXT NOT NULL,
            line_start   INTEGER NOT NULL,
            line_end     INTEGER NOT NULL,
            snippet      TEXT,
            hash         TEXT NOT NULL,
            validated_at TEXT,
            valid        INTEGER,
            PRIMARY KEY (memory_id, file_path, line_start)
        );

        CREATE INDEX IF NOT EXISTS idx_memory_files_path ON memory_files(file_path);

        CREATE TABLE IF NOT EXISTS memory_functions (
            memory_id     TEXT NOT NULL,
            function_name TEXT NOT NULL,
            file_path     TEXT NOT NULL,
            signature     TEXT,
            PRIMARY KEY (memory_id, function_name, file_path)
        );

        CREATE TABLE IF NOT EXISTS relationships (
            source_id         TEXT NOT NULL,
            target_id         TEXT NOT NULL,
            relationship_type TEXT NOT NULL,
            PRIMARY KEY (source_id, target_id, relationship_type)
        );

        CREATE VIRTUAL TABLE IF NOT EXISTS memories_fts USING fts5(
            id UNINDEXED,
            summary,
            tags
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
