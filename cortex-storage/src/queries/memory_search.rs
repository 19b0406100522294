//! FTS5 keyword search over summaries and tags.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::BaseMemory;

use crate::to_storage_err;

use super::memory_crud::{load_links, row_to_base_memory, MEMORY_COLUMNS};

/// Keyword search. The query string is sanitized into FTS5 terms joined by
/// OR so natural-language input never trips the MATCH parser.
pub fn search_text(conn: &Connection, text: &str, limit: usize) -> CortexResult<Vec<BaseMemory>> {
    let match_expr = sanitize_match(text);
    if match_expr.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories
         WHERE archived = 0 AND id IN (
             SELECT id FROM memories_fts WHERE memories_fts MATCH ?1 ORDER BY rank LIMIT ?2
         )"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![match_expr, limit as i64], |row| {
            Ok(row_to_base_memory(row))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut memories = Vec::with_capacity(rows.len());
    for parsed in rows {
        let mut memory = parsed?;
        load_links(conn, &mut memory)?;
        memories.push(memory);
    }
    Ok(memories)
}

/// Keep alphanumeric terms, quote each, join with OR.
fn sanitize_match(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}
