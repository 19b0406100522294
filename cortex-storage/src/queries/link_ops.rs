//! Incremental link additions outside a full memory update.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{ConstraintLink, PatternLink};

use crate::to_storage_err;

pub fn add_pattern_link(
    conn: &Connection,
    memory_id: &str,
    link: &PatternLink,
) -> CortexResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO memory_patterns (memory_id, pattern_id, pattern_name) VALUES (?1, ?2, ?3)",
        params![memory_id, link.pattern_id, link.pattern_name],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn add_constraint_link(
    conn: &Connection,
    memory_id: &str,
    link: &ConstraintLink,
) -> CortexResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO memory_constraints (memory_id, constraint_id, constraint_name) VALUES (?1, ?2, ?3)",
        params![memory_id, link.constraint_id, link.constraint_name],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
