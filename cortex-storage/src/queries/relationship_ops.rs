//! Lightweight relationship table ops.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{RelationshipEdge, RelationshipType};

use crate::to_storage_err;

pub fn add_relationship(conn: &Connection, edge: &RelationshipEdge) -> CortexResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO relationships (source_id, target_id, relationship_type)
         VALUES (?1, ?2, ?3)",
        params![
            edge.source_id,
            edge.target_id,
            edge.relationship_type.as_str()
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Relationships touching a memory, optionally filtered by type.
pub fn get_related(
    conn: &Connection,
    memory_id: &str,
    rel_type: Option<RelationshipType>,
) -> CortexResult<Vec<RelationshipEdge>> {
    let (sql, filter): (&str, Option<&'static str>) = match rel_type {
        Some(t) => (
            "SELECT source_id, target_id, relationship_type FROM relationships
             WHERE (source_id = ?1 OR target_id = ?1) AND relationship_type = ?2",
            Some(t.as_str()),
        ),
        None => (
            "SELECT source_id, target_id, relationship_type FROM relationships
             WHERE source_id = ?1 OR target_id = ?1",
            None,
        ),
    };

    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, String, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    };
    let raw = match filter {
        Some(t) => stmt
            .query_map(params![memory_id, t], map_row)
            .map_err(|e| to_storage_err(e.to_string()))?
            .collect::<Result<Vec<_>, _>>(),
        None => stmt
            .query_map(params![memory_id], map_row)
            .map_err(|e| to_storage_err(e.to_string()))?
            .collect::<Result<Vec<_>, _>>(),
    }
    .map_err(|e| to_storage_err(e.to_string()))?;

    let mut edges = Vec::with_capacity(raw.len());
    for (source_id, target_id, type_str) in raw {
        edges.push(RelationshipEdge {
            source_id,
            target_id,
            relationship_type: type_str
                .parse()
                .map_err(|e: String| to_storage_err(format!("parse relationship: {e}")))?,
        });
    }
    Ok(edges)
}
