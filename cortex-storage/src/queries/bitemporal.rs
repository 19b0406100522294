//! Point-in-time queries over the two time axes.
//!
//! A record is visible at `(system_time, valid_time)` when the system knew it
//! by `system_time` and the fact held at `valid_time`. Of each supersession
//! chain, only the version that was latest as of `system_time` is returned.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::BaseMemory;

use crate::to_storage_err;

use super::memory_crud::{load_links, row_to_base_memory, MEMORY_COLUMNS};

/// All memories known at `system_time` whose validity interval contains
/// `valid_time`, reduced to then-latest non-superseded versions.
pub fn query_as_of(
    conn: &Connection,
    system_time: DateTime<Utc>,
    valid_time: DateTime<Utc>,
) -> CortexResult<Vec<BaseMemory>> {
    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE transaction_time <= ?1
           AND valid_time <= ?2
           AND (valid_until IS NULL OR valid_until >= ?2)"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(
            params![system_time.to_rfc3339(), valid_time.to_rfc3339()],
            |row| Ok(row_to_base_memory(row)),
        )
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut candidates = Vec::with_capacity(rows.len());
    for parsed in rows {
        candidates.push(parsed?);
    }

    let latest = resolve_latest_versions(candidates, system_time);

    let mut memories = Vec::with_capacity(latest.len());
    for mut memory in latest {
        load_links(conn, &mut memory)?;
        memories.push(memory);
    }
    Ok(memories)
}

/// Walk `superseded_by` forward within the visible set: a version is kept
/// only when no visible successor replaced it by `system_time`.
fn resolve_latest_versions(
    candidates: Vec<BaseMemory>,
    system_time: DateTime<Utc>,
) -> Vec<BaseMemory> {
    let by_id: HashMap<String, &BaseMemory> =
        candidates.iter().map(|m| (m.id.clone(), m)).collect();

    let mut kept = Vec::new();
    for memory in &candidates {
        let mut superseded = false;
        let mut cursor = memory.superseded_by.clone();
        // Bounded walk: chains are acyclic by invariant, but cap the hops
        // so corrupt data cannot loop forever.
        let mut hops = 0;
        while let Some(successor_id) = cursor {
            hops += 1;
            if hops > 64 {
                break;
            }
            match by_id.get(&successor_id) {
                Some(successor) if successor.transaction_time <= system_time => {
                    superseded = true;
                    break;
                }
                Some(successor) => {
                    cursor = successor.superseded_by.clone();
                }
                None => break,
            }
        }
        if !superseded {
            kept.push(memory.clone());
        }
    }
    kept
}
