//! Insert, update, get, delete, bulk ops for memories.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{BaseMemory, Citation, Confidence, TypedContent};

use crate::{to_serialization_err, to_storage_err};

/// Insert a single memory.
/// Wrapped in a transaction: memory row + links + FTS row are all-or-nothing.
pub fn insert_memory(conn: &Connection, memory: &BaseMemory) -> CortexResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("insert_memory begin: {e}")))?;

    match insert_memory_inner(&tx, memory) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("insert_memory commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Inner insert logic, operating on the provided connection (or transaction via Deref).
fn insert_memory_inner(conn: &Connection, memory: &BaseMemory) -> CortexResult<()> {
    let content_json =
        serde_json::to_string(&memory.content).map_err(|e| to_serialization_err(e.to_string()))?;
    let tags_json =
        serde_json::to_string(&memory.tags).map_err(|e| to_serialization_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO memories (
            id, memory_type, content, summary, confidence, importance,
            transaction_time, valid_time, valid_until, created_at, updated_at,
            last_accessed, last_validated, access_count, created_by, tags,
            archived, archive_reason, superseded_by, supersedes, content_hash
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21
        )",
        params![
            memory.id,
            memory.memory_type.as_str(),
            content_json,
            memory.summary,
            memory.confidence.value(),
            memory.importance.as_str(),
            memory.transaction_time.to_rfc3339(),
            memory.valid_time.to_rfc3339(),
            memory.valid_until.map(|t| t.to_rfc3339()),
            memory.created_at.to_rfc3339(),
            memory.updated_at.to_rfc3339(),
            memory.last_accessed.to_rfc3339(),
            memory.last_validated.map(|t| t.to_rfc3339()),
            memory.access_count,
            memory.created_by,
            tags_json,
            memory.archived as i32,
            memory.archive_reason,
            memory.superseded_by,
            memory.supersedes,
            memory.content_hash,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    insert_links(conn, memory)?;
    insert_fts_row(conn, memory)?;
    Ok(())
}

/// Insert all link types for a memory.
fn insert_links(conn: &Connection, memory: &BaseMemory) -> CortexResult<()> {
    for link in &memory.linked_patterns {
        conn.execute(
            "INSERT OR IGNORE INTO memory_patterns (memory_id, pattern_id, pattern_name) VALUES (?1, ?2, ?3)",
            params![memory.id, link.pattern_id, link.pattern_name],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    for link in &memory.linked_constraints {
        conn.execute(
            "INSERT OR IGNORE INTO memory_constraints (memory_id, constraint_id, constraint_name) VALUES (?1, ?2, ?3)",
            params![memory.id, link.constraint_id, link.constraint_name],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    for citation in &memory.linked_files {
        conn.execute(
            "INSERT OR IGNORE INTO memory_files (memory_id, file_path, line_start, line_end, snippet, hash, validated_at, valid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                memory.id,
                citation.file_path,
                citation.line_start,
                citation.line_end,
                citation.snippet,
                citation.hash,
                citation.validated_at.map(|t| t.to_rfc3339()),
                citation.valid.map(|v| v as i32),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    for link in &memory.linked_functions {
        conn.execute(
            "INSERT OR IGNORE INTO memory_functions (memory_id, function_name, file_path, signature) VALUES (?1, ?2, ?3, ?4)",
            params![memory.id, link.function_name, link.file_path, link.signature],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

fn insert_fts_row(conn: &Connection, memory: &BaseMemory) -> CortexResult<()> {
    conn.execute(
        "INSERT INTO memories_fts (id, summary, tags) VALUES (?1, ?2, ?3)",
        params![memory.id, memory.summary, memory.tags.join(" ")],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

fn delete_fts_row(conn: &Connection, id: &str) -> CortexResult<()> {
    conn.execute("DELETE FROM memories_fts WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Get a single memory by ID, including all links.
pub fn get_memory(conn: &Connection, id: &str) -> CortexResult<Option<BaseMemory>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let result = stmt
        .query_row(params![id], |row| Ok(row_to_base_memory(row)))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match result {
        Some(Ok(mut memory)) => {
            load_links(conn, &mut memory)?;
            Ok(Some(memory))
        }
        Some(Err(e)) => Err(e),
        None => Ok(None),
    }
}

/// Replace a memory row with updated state. The caller (engine) has already
/// merged the patch and bumped timestamps. Wrapped in a transaction.
pub fn update_memory(conn: &Connection, memory: &BaseMemory) -> CortexResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("update_memory begin: {e}")))?;

    match update_memory_inner(&tx, memory) {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("update_memory commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

fn update_memory_inner(conn: &Connection, memory: &BaseMemory) -> CortexResult<()> {
    let content_json =
        serde_json::to_string(&memory.content).map_err(|e| to_serialization_err(e.to_string()))?;
    let tags_json =
        serde_json::to_string(&memory.tags).map_err(|e| to_serialization_err(e.to_string()))?;

    let rows = conn
        .execute(
            "UPDATE memories SET
                memory_type = ?2, content = ?3, summary = ?4, confidence = ?5,
                importance = ?6, transaction_time = ?7, valid_time = ?8,
                valid_until = ?9, updated_at = ?10, last_accessed = ?11,
                last_validated = ?12, access_count = ?13, created_by = ?14,
                tags = ?15, archived = ?16, archive_reason = ?17,
                superseded_by = ?18, supersedes = ?19, content_hash = ?20
             WHERE id = ?1",
            params![
                memory.id,
                memory.memory_type.as_str(),
                content_json,
                memory.summary,
                memory.confidence.value(),
                memory.importance.as_str(),
                memory.transaction_time.to_rfc3339(),
                memory.valid_time.to_rfc3339(),
                memory.valid_until.map(|t| t.to_rfc3339()),
                memory.updated_at.to_rfc3339(),
                memory.last_accessed.to_rfc3339(),
                memory.last_validated.map(|t| t.to_rfc3339()),
                memory.access_count,
                memory.created_by,
                tags_json,
                memory.archived as i32,
                memory.archive_reason,
                memory.superseded_by,
                memory.supersedes,
                memory.content_hash,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(cortex_core::CortexError::MemoryNotFound {
            id: memory.id.clone(),
        });
    }

    // Re-insert links (delete old, insert new), refresh the FTS row.
    delete_links(conn, &memory.id)?;
    insert_links(conn, memory)?;
    delete_fts_row(conn, &memory.id)?;
    insert_fts_row(conn, memory)?;
    Ok(())
}

/// Hard-delete a memory by ID.
/// Wrapped in a transaction: links + FTS + row are all-or-nothing.
pub fn delete_memory(conn: &Connection, id: &str) -> CortexResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("delete_memory begin: {e}")))?;

    let result = (|| {
        delete_links(&tx, id)?;
        delete_fts_row(&tx, id)?;
        let rows = tx
            .execute("DELETE FROM memories WHERE id = ?1", params![id])
            .map_err(|e| to_storage_err(e.to_string()))?;
        if rows == 0 {
            return Err(cortex_core::CortexError::MemoryNotFound { id: id.to_string() });
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            tx.commit()
                .map_err(|e| to_storage_err(format!("delete_memory commit: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = tx.rollback();
            Err(e)
        }
    }
}

/// Bulk insert memories in a single transaction. Returns the number inserted.
pub fn bulk_insert(conn: &Connection, memories: &[BaseMemory]) -> CortexResult<usize> {
    if memories.is_empty() {
        return Ok(0);
    }
    conn.execute_batch("BEGIN IMMEDIATE")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut count = 0;
    for memory in memories {
        if let Err(e) = insert_memory_inner(conn, memory) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(e);
        }
        count += 1;
    }

    conn.execute_batch("COMMIT")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count)
}

/// Find a memory id carrying the given content hash, if any.
pub fn find_by_content_hash(conn: &Connection, hash: &str) -> CortexResult<Option<String>> {
    conn.query_row(
        "SELECT id FROM memories WHERE content_hash = ?1 LIMIT 1",
        params![hash],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Bulk get memories by IDs. Unknown ids are skipped.
pub fn bulk_get(conn: &Connection, ids: &[String]) -> CortexResult<Vec<BaseMemory>> {
    let mut results = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(memory) = get_memory(conn, id)? {
            results.push(memory);
        }
    }
    Ok(results)
}

/// Bump access_count and last_accessed for a set of ids.
pub fn record_access(conn: &Connection, ids: &[String], now: &str) -> CortexResult<()> {
    let mut stmt = conn
        .prepare(
            "UPDATE memories SET access_count = access_count + 1, last_accessed = ?2 WHERE id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    for id in ids {
        stmt.execute(params![id, now])
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

/// Delete all links for a memory.
fn delete_links(conn: &Connection, memory_id: &str) -> CortexResult<()> {
    for table in &[
        "memory_patterns",
        "memory_constraints",
        "memory_files",
        "memory_functions",
    ] {
        conn.execute(
            &format!("DELETE FROM {table} WHERE memory_id = ?1"),
            params![memory_id],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

/// Load all links for a memory from the link tables.
pub(crate) fn load_links(conn: &Connection, memory: &mut BaseMemory) -> CortexResult<()> {
    let mut stmt = conn
        .prepare("SELECT pattern_id, pattern_name FROM memory_patterns WHERE memory_id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    memory.linked_patterns = stmt
        .query_map(params![memory.id], |row| {
            Ok(cortex_core::memory::PatternLink {
                pattern_id: row.get(0)?,
                pattern_name: row.get(1)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stmt = conn
        .prepare(
            "SELECT constraint_id, constraint_name FROM memory_constraints WHERE memory_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    memory.linked_constraints = stmt
        .query_map(params![memory.id], |row| {
            Ok(cortex_core::memory::ConstraintLink {
                constraint_id: row.get(0)?,
                constraint_name: row.get(1)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stmt = conn
        .prepare(
            "SELECT file_path, line_start, line_end, snippet, hash, validated_at, valid
             FROM memory_files WHERE memory_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    memory.linked_files = stmt
        .query_map(params![memory.id], |row| {
            let validated_at: Option<String> = row.get(5)?;
            let valid: Option<i32> = row.get(6)?;
            Ok(Citation {
                file_path: row.get(0)?,
                line_start: row.get(1)?,
                line_end: row.get(2)?,
                snippet: row.get(3)?,
                hash: row.get(4)?,
                validated_at: validated_at.and_then(|s| {
                    chrono::DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&chrono::Utc))
                        .ok()
                }),
                valid: valid.map(|v| v != 0),
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut stmt = conn
        .prepare(
            "SELECT function_name, file_path, signature FROM memory_functions WHERE memory_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    memory.linked_functions = stmt
        .query_map(params![memory.id], |row| {
            Ok(cortex_core::memory::FunctionLink {
                function_name: row.get(0)?,
                file_path: row.get(1)?,
                signature: row.get(2)?,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}

/// Columns selected whenever a full memory row is parsed.
pub(crate) const MEMORY_COLUMNS: &str = "id, memory_type, content, summary, confidence, importance, \
     transaction_time, valid_time, valid_until, created_at, updated_at, \
     last_accessed, last_validated, access_count, created_by, tags, \
     archived, archive_reason, superseded_by, supersedes, content_hash";

/// Parse a row (in `MEMORY_COLUMNS` order) into a BaseMemory.
pub(crate) fn row_to_base_memory(row: &rusqlite::Row<'_>) -> CortexResult<BaseMemory> {
    let get_str = |idx: usize| -> CortexResult<String> {
        row.get(idx).map_err(|e| to_storage_err(e.to_string()))
    };
    let get_opt_str = |idx: usize| -> CortexResult<Option<String>> {
        row.get(idx).map_err(|e| to_storage_err(e.to_string()))
    };
    let parse_dt = |s: &str| -> CortexResult<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| to_storage_err(format!("parse datetime '{s}': {e}")))
    };

    let memory_type = get_str(1)?
        .parse()
        .map_err(|e: String| to_storage_err(format!("parse memory_type: {e}")))?;
    let content: TypedContent = serde_json::from_str(&get_str(2)?)
        .map_err(|e| to_serialization_err(format!("parse content: {e}")))?;
    let importance = get_str(5)?
        .parse()
        .map_err(|e: String| to_storage_err(format!("parse importance: {e}")))?;
    let tags: Vec<String> = serde_json::from_str(&get_str(15)?)
        .map_err(|e| to_serialization_err(format!("parse tags: {e}")))?;

    Ok(BaseMemory {
        id: get_str(0)?,
        memory_type,
        content,
        summary: get_str(3)?,
        confidence: Confidence::new(row.get(4).map_err(|e| to_storage_err(e.to_string()))?),
        importance,
        transaction_time: parse_dt(&get_str(6)?)?,
        valid_time: parse_dt(&get_str(7)?)?,
        valid_until: get_opt_str(8)?.as_deref().map(parse_dt).transpose()?,
        created_at: parse_dt(&get_str(9)?)?,
        updated_at: parse_dt(&get_str(10)?)?,
        last_accessed: parse_dt(&get_str(11)?)?,
        last_validated: get_opt_str(12)?.as_deref().map(parse_dt).transpose()?,
        access_count: row
            .get::<_, i64>(13)
            .map_err(|e| to_storage_err(e.to_string()))? as u64,
        created_by: get_opt_str(14)?,
        linked_patterns: Vec::new(),
        linked_constraints: Vec::new(),
        linked_files: Vec::new(),
        linked_functions: Vec::new(),
        tags,
        archived: row
            .get::<_, i32>(16)
            .map_err(|e| to_storage_err(e.to_string()))?
            != 0,
        archive_reason: get_opt_str(17)?,
        superseded_by: get_opt_str(18)?,
        supersedes: get_opt_str(19)?,
        content_hash: get_str(20)?,
    })
}

/// Helper trait to make `query_row` return `Option` on not-found.
pub(crate) trait OptionalRow<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalRow<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
