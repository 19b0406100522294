//! Causal edge persistence. Merge policy lives in cortex-causal; this module
//! only enforces the `(source, target, relation)` uniqueness and tombstones.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::models::{CausalEdge, CausalRelation};

use crate::{to_serialization_err, to_storage_err};

use super::memory_crud::OptionalRow;

const EDGE_COLUMNS: &str = "id, source_id, target_id, relation, strength, evidence, \
     created_at, validated_at, inferred, created_by, tombstone";

pub fn insert_edge(conn: &Connection, edge: &CausalEdge) -> CortexResult<()> {
    let evidence_json =
        serde_json::to_string(&edge.evidence).map_err(|e| to_serialization_err(e.to_string()))?;
    conn.execute(
        "INSERT INTO causal_edges (
            id, source_id, target_id, relation, strength, evidence,
            created_at, validated_at, inferred, created_by, tombstone
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            edge.id,
            edge.source_id,
            edge.target_id,
            edge.relation.as_str(),
            edge.strength,
            evidence_json,
            edge.created_at.to_rfc3339(),
            edge.validated_at.map(|t| t.to_rfc3339()),
            edge.inferred as i32,
            edge.created_by,
            edge.tombstone as i32,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Rewrite an existing edge in place (same id).
pub fn update_edge(conn: &Connection, edge: &CausalEdge) -> CortexResult<()> {
    let evidence_json =
        serde_json::to_string(&edge.evidence).map_err(|e| to_serialization_err(e.to_string()))?;
    let rows = conn
        .execute(
            "UPDATE causal_edges SET
                strength = ?2, evidence = ?3, validated_at = ?4,
                inferred = ?5, tombstone = ?6
             WHERE id = ?1",
            params![
                edge.id,
                edge.strength,
                evidence_json,
                edge.validated_at.map(|t| t.to_rfc3339()),
                edge.inferred as i32,
                edge.tombstone as i32,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if rows == 0 {
        return Err(cortex_core::CortexError::CausalError(
            cortex_core::errors::CausalError::GraphInconsistency {
                details: format!("edge {} not found for update", edge.id),
            },
        ));
    }
    Ok(())
}

pub fn get_edge(
    conn: &Connection,
    source_id: &str,
    target_id: &str,
    relation: CausalRelation,
) -> CortexResult<Option<CausalEdge>> {
    let sql = format!(
        "SELECT {EDGE_COLUMNS} FROM causal_edges
         WHERE source_id = ?1 AND target_id = ?2 AND relation = ?3"
    );
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let result = stmt
        .query_row(params![source_id, target_id, relation.as_str()], |row| {
            Ok(row_to_edge(row))
        })
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    result.transpose()
}

/// All live edges touching a node, either direction.
pub fn get_edges(conn: &Connection, node_id: &str) -> CortexResult<Vec<CausalEdge>> {
    let sql = format!(
        "SELECT {EDGE_COLUMNS} FROM causal_edges
         WHERE (source_id = ?1 OR target_id = ?1) AND tombstone = 0"
    );
    collect_edges(conn, &sql, params![node_id])
}

/// Live edges leaving a node.
pub fn get_edges_from(conn: &Connection, node_id: &str) -> CortexResult<Vec<CausalEdge>> {
    let sql = format!(
        "SELECT {EDGE_COLUMNS} FROM causal_edges WHERE source_id = ?1 AND tombstone = 0"
    );
    collect_edges(conn, &sql, params![node_id])
}

pub fn get_all_edges(conn: &Connection, include_tombstoned: bool) -> CortexResult<Vec<CausalEdge>> {
    let sql = if include_tombstoned {
        format!("SELECT {EDGE_COLUMNS} FROM causal_edges")
    } else {
        format!("SELECT {EDGE_COLUMNS} FROM causal_edges WHERE tombstone = 0")
    };
    collect_edges(conn, &sql, params![])
}

/// Tombstone every edge touching a memory. The rows stay so historical chain
/// explanations survive the memory's deletion.
pub fn tombstone_edges(conn: &Connection, memory_id: &str) -> CortexResult<usize> {
    let rows = conn
        .execute(
            "UPDATE causal_edges SET tombstone = 1 WHERE source_id = ?1 OR target_id = ?1",
            params![memory_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(rows)
}

pub fn edge_count(conn: &Connection) -> CortexResult<usize> {
    let n: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM causal_edges WHERE tombstone = 0",
            params![],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}

fn collect_edges<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> CortexResult<Vec<CausalEdge>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, |row| Ok(row_to_edge(row)))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.into_iter().collect()
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> CortexResult<CausalEdge> {
    let relation_str: String = row.get(3).map_err(|e| to_storage_err(e.to_string()))?;
    let evidence_json: String = row.get(5).map_err(|e| to_storage_err(e.to_string()))?;
    let created_at_str: String = row.get(6).map_err(|e| to_storage_err(e.to_string()))?;
    let validated_at_str: Option<String> = row.get(7).map_err(|e| to_storage_err(e.to_string()))?;

    let parse_dt = |s: &str| {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
    };

    Ok(CausalEdge {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        source_id: row.get(1).map_err(|e| to_storage_err(e.to_string()))?,
        target_id: row.get(2).map_err(|e| to_storage_err(e.to_string()))?,
        relation: relation_str
            .parse()
            .map_err(|e: String| to_storage_err(format!("parse relation: {e}")))?,
        strength: row.get(4).map_err(|e| to_storage_err(e.to_string()))?,
        evidence: serde_json::from_str(&evidence_json)
            .map_err(|e| to_serialization_err(format!("parse evidence: {e}")))?,
        created_at: parse_dt(&created_at_str)?,
        validated_at: validated_at_str.as_deref().map(parse_dt).transpose()?,
        inferred: row.get::<_, i32>(8).map_err(|e| to_storage_err(e.to_string()))? != 0,
        created_by: row.get(9).map_err(|e| to_storage_err(e.to_string()))?,
        tombstone: row.get::<_, i32>(10).map_err(|e| to_storage_err(e.to_string()))? != 0,
    })
}
