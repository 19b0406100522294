//! Filter search: translates a `MemoryQuery` into SQL.

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{BaseMemory, MemoryQuery};
use cortex_core::models::MemorySummary;

use crate::to_storage_err;

use super::memory_crud::{load_links, row_to_base_memory, MEMORY_COLUMNS};

/// Run a filter query, returning full memories with links, ordered and paged.
pub fn search(conn: &Connection, query: &MemoryQuery) -> CortexResult<Vec<BaseMemory>> {
    let (where_clause, params) = build_where(query);
    let sql = format!(
        "SELECT {MEMORY_COLUMNS} FROM memories {where_clause} ORDER BY {} {} LIMIT {} OFFSET {}",
        query.order_by.column(),
        query.order_dir.keyword(),
        query.effective_limit(),
        query.effective_offset(),
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| Ok(row_to_base_memory(row)))
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

/// Count rows matching a query, ignoring limit/offset.
pub fn count(conn: &Connection, query: &MemoryQuery) -> CortexResult<usize> {
    let (where_clause, params) = build_where(query);
    let sql = format!("SELECT COUNT(*) FROM memories {where_clause}");
    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let n: i64 = stmt
        .query_row(params_from_iter(params), |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(n as usize)
}

/// Lightweight projection: summaries only, no link loading.
pub fn get_summaries(conn: &Connection, query: &MemoryQuery) -> CortexResult<Vec<MemorySummary>> {
    let (where_clause, params) = build_where(query);
    let sql = format!(
        "SELECT id, memory_type, summary, confidence, importance, created_at, last_accessed, access_count
         FROM memories {where_clause} ORDER BY {} {} LIMIT {} OFFSET {}",
        query.order_by.column(),
        query.order_dir.keyword(),
        query.effective_limit(),
        query.effective_offset(),
    );

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let parse_dt = |s: String| {
        chrono::DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .unwrap_or_default()
    };
    let summaries = stmt
        .query_map(params_from_iter(params), |row| {
            Ok(MemorySummary {
                id: row.get(0)?,
                memory_type: row
                    .get::<_, String>(1)?
                    .parse()
                    .unwrap_or(cortex_core::memory::MemoryType::Semantic),
                summary: row.get(2)?,
                confidence: row.get(3)?,
                importance: row
                    .get::<_, String>(4)?
                    .parse()
                    .unwrap_or_default(),
                created_at: parse_dt(row.get(5)?),
                last_accessed: parse_dt(row.get(6)?),
                access_count: row.get::<_, i64>(7)? as u64,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(summaries)
}

/// Build the WHERE clause and parameter list for a query.
fn build_where(query: &MemoryQuery) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if !query.include_archived {
        clauses.push("archived = 0".to_string());
    }

    if let Some(types) = &query.types {
        if !types.is_empty() {
            let placeholders = vec!["?"; types.len()].join(", ");
            clauses.push(format!("memory_type IN ({placeholders})"));
            for t in types {
                params.push(Value::Text(t.as_str().to_string()));
            }
        }
    }

    if let Some(importance) = &query.importance {
        if !importance.is_empty() {
            let placeholders = vec!["?"; importance.len()].join(", ");
            clauses.push(format!("importance IN ({placeholders})"));
            for i in importance {
                params.push(Value::Text(i.as_str().to_string()));
            }
        }
    }

    if let Some(topics) = &query.topics {
        for topic in topics {
            clauses.push("summary LIKE ?".to_string());
            params.push(Value::Text(format!("%{topic}%")));
        }
    }

    if let Some(decisions) = &query.decisions {
        for decision in decisions {
            clauses.push("content LIKE ?".to_string());
            params.push(Value::Text(format!("%{decision}%")));
        }
    }

    if let Some(min) = query.min_confidence {
        clauses.push("confidence >= ?".to_string());
        params.push(Value::Real(min));
    }
    if let Some(max) = query.max_confidence {
        clauses.push("confidence <= ?".to_string());
        params.push(Value::Real(max));
    }
    if let Some(min) = query.min_access_count {
        clauses.push("access_count >= ?".to_string());
        params.push(Value::Integer(min as i64));
    }
    if let Some(min_date) = query.min_date {
        clauses.push("created_at >= ?".to_string());
        params.push(Value::Text(min_date.to_rfc3339()));
    }
    if let Some(max_date) = query.max_date {
        clauses.push("created_at <= ?".to_string());
        params.push(Value::Text(max_date.to_rfc3339()));
    }

    if let Some(tags) = &query.tags {
        // Tags persist as a JSON array; match the quoted element.
        for tag in tags {
            clauses.push("tags LIKE ?".to_string());
            params.push(Value::Text(format!("%\"{tag}\"%")));
        }
    }

    if let Some(status) = query.consolidation_status {
        clauses.push("content LIKE ?".to_string());
        params.push(Value::Text(format!(
            "%\"consolidation_status\":\"{}\"%",
            status.as_str()
        )));
    }

    if let Some(patterns) = &query.patterns {
        if !patterns.is_empty() {
            let placeholders = vec!["?"; patterns.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM memory_patterns mp WHERE mp.memory_id = memories.id AND mp.pattern_id IN ({placeholders}))"
            ));
            for p in patterns {
                params.push(Value::Text(p.clone()));
            }
        }
    }

    if let Some(constraints) = &query.constraints {
        if !constraints.is_empty() {
            let placeholders = vec!["?"; constraints.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM memory_constraints mc WHERE mc.memory_id = memories.id AND mc.constraint_id IN ({placeholders}))"
            ));
            for c in constraints {
                params.push(Value::Text(c.clone()));
            }
        }
    }

    if let Some(files) = &query.files {
        if !files.is_empty() {
            let placeholders = vec!["?"; files.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM memory_files mf WHERE mf.memory_id = memories.id AND mf.file_path IN ({placeholders}))"
            ));
            for f in files {
                params.push(Value::Text(f.clone()));
            }
        }
    }

    if let Some(functions) = &query.functions {
        if !functions.is_empty() {
            let placeholders = vec!["?"; functions.len()].join(", ");
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM memory_functions mfn WHERE mfn.memory_id = memories.id AND mfn.function_name IN ({placeholders}))"
            ));
            for f in functions {
                params.push(Value::Text(f.clone()));
            }
        }
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    (where_clause, params)
}
