//! Aggregate statistics over the memories table.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::MemoryType;

use crate::to_storage_err;

pub fn count_by_type(conn: &Connection) -> CortexResult<Vec<(MemoryType, usize)>> {
    let mut stmt = conn
        .prepare(
            "SELECT memory_type, COUNT(*) FROM memories WHERE archived = 0 GROUP BY memory_type",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut counts = Vec::with_capacity(rows.len());
    for (type_str, n) in rows {
        let memory_type: MemoryType = type_str
            .parse()
            .map_err(|e: String| to_storage_err(format!("parse memory_type: {e}")))?;
        counts.push((memory_type, n as usize));
    }
    Ok(counts)
}

pub fn average_confidence(conn: &Connection) -> CortexResult<f64> {
    conn.query_row(
        "SELECT COALESCE(AVG(confidence), 0.0) FROM memories WHERE archived = 0",
        params![],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Memories not validated within the threshold. The cutoff is computed
/// here so the comparison stays within one timestamp format.
pub fn stale_count(conn: &Connection, threshold_days: u64) -> CortexResult<usize> {
    let cutoff =
        (chrono::Utc::now() - chrono::Duration::days(threshold_days as i64)).to_rfc3339();
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM memories
             WHERE archived = 0
               AND COALESCE(last_validated, created_at) < ?1",
            params![cutoff],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}
