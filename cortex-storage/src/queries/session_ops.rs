//! Session persistence: snapshots plus loaded-set rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::models::{LoadedKind, SessionSnapshot};

use crate::{to_serialization_err, to_storage_err};

use super::memory_crud::OptionalRow;

pub fn save_session(conn: &Connection, snapshot: &SessionSnapshot) -> CortexResult<()> {
    let metadata_json = snapshot
        .metadata
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| to_serialization_err(e.to_string()))?;

    conn.execute(
        "INSERT OR REPLACE INTO sessions (
            id, started_at, ended_at, last_activity, tokens_sent, queries_made, metadata
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            snapshot.id,
            snapshot.started_at.to_rfc3339(),
            snapshot.ended_at.map(|t| t.to_rfc3339()),
            snapshot.last_activity.to_rfc3339(),
            snapshot.tokens_sent as i64,
            snapshot.queries_made,
            metadata_json,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    // Loaded sets are add-only; INSERT OR IGNORE keeps existing rows intact.
    let loaded_at = snapshot.last_activity.to_rfc3339();
    for (kind, ids) in [
        (LoadedKind::Memory, &snapshot.loaded_memories),
        (LoadedKind::Pattern, &snapshot.loaded_patterns),
        (LoadedKind::File, &snapshot.loaded_files),
        (LoadedKind::Constraint, &snapshot.loaded_constraints),
    ] {
        for id in ids {
            conn.execute(
                "INSERT OR IGNORE INTO session_loaded (session_id, kind, target_id, loaded_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![snapshot.id, kind.as_str(), id, loaded_at],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
        }
    }
    Ok(())
}

pub fn load_session(conn: &Connection, session_id: &str) -> CortexResult<Option<SessionSnapshot>> {
    let row = conn
        .query_row(
            "SELECT id, started_at, ended_at, last_activity, tokens_sent, queries_made, metadata
             FROM sessions WHERE id = ?1",
            params![session_id],
            |row| Ok(row_to_snapshot(row)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match row {
        Some(Ok(mut snapshot)) => {
            load_loaded_sets(conn, &mut snapshot)?;
            Ok(Some(snapshot))
        }
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

pub fn load_open_sessions(conn: &Connection) -> CortexResult<Vec<SessionSnapshot>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, started_at, ended_at, last_activity, tokens_sent, queries_made, metadata
             FROM sessions WHERE ended_at IS NULL",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![], |row| Ok(row_to_snapshot(row)))
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut snapshots = Vec::with_capacity(rows.len());
    for parsed in rows {
        let mut snapshot = parsed?;
        load_loaded_sets(conn, &mut snapshot)?;
        snapshots.push(snapshot);
    }
    Ok(snapshots)
}

/// Drop ended sessions last active before the cutoff. Returns the count.
pub fn delete_ended_before(conn: &Connection, cutoff: DateTime<Utc>) -> CortexResult<usize> {
    conn.execute(
        "DELETE FROM session_loaded WHERE session_id IN (
             SELECT id FROM sessions WHERE ended_at IS NOT NULL AND last_activity < ?1
         )",
        params![cutoff.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = conn
        .execute(
            "DELETE FROM sessions WHERE ended_at IS NOT NULL AND last_activity < ?1",
            params![cutoff.to_rfc3339()],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(rows)
}

pub fn record_loaded(
    conn: &Connection,
    session_id: &str,
    kind: LoadedKind,
    target_id: &str,
    token_count: usize,
    compression_level: u8,
) -> CortexResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO session_loaded
            (session_id, kind, target_id, loaded_at, token_count, compression_level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            session_id,
            kind.as_str(),
            target_id,
            Utc::now().to_rfc3339(),
            token_count as i64,
            compression_level,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn load_loaded_sets(conn: &Connection, snapshot: &mut SessionSnapshot) -> CortexResult<()> {
    let mut stmt = conn
        .prepare("SELECT kind, target_id FROM session_loaded WHERE session_id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![snapshot.id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    for (kind_str, target_id) in rows {
        match kind_str.parse::<LoadedKind>() {
            Ok(LoadedKind::Memory) => snapshot.loaded_memories.push(target_id),
            Ok(LoadedKind::Pattern) => snapshot.loaded_patterns.push(target_id),
            Ok(LoadedKind::File) => snapshot.loaded_files.push(target_id),
            Ok(LoadedKind::Constraint) => snapshot.loaded_constraints.push(target_id),
            Err(e) => tracing::warn!(session_id = %snapshot.id, error = %e, "skipping loaded row"),
        }
    }
    Ok(())
}

fn row_to_snapshot(row: &rusqlite::Row<'_>) -> CortexResult<SessionSnapshot> {
    let parse_dt = |s: &str| {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
    };
    let started_at: String = row.get(1).map_err(|e| to_storage_err(e.to_string()))?;
    let ended_at: Option<String> = row.get(2).map_err(|e| to_storage_err(e.to_string()))?;
    let last_activity: String = row.get(3).map_err(|e| to_storage_err(e.to_string()))?;
    let metadata_json: Option<String> = row.get(6).map_err(|e| to_storage_err(e.to_string()))?;

    Ok(SessionSnapshot {
        id: row.get(0).map_err(|e| to_storage_err(e.to_string()))?,
        started_at: parse_dt(&started_at)?,
        ended_at: ended_at.as_deref().map(parse_dt).transpose()?,
        last_activity: parse_dt(&last_activity)?,
        tokens_sent: row
            .get::<_, i64>(4)
            .map_err(|e| to_storage_err(e.to_string()))? as usize,
        queries_made: row
            .get::<_, i64>(5)
            .map_err(|e| to_storage_err(e.to_string()))? as u64,
        loaded_memories: Vec::new(),
        loaded_patterns: Vec::new(),
        loaded_files: Vec::new(),
        loaded_constraints: Vec::new(),
        metadata: metadata_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok()),
    })
}
