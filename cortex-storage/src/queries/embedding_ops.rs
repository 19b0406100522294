//! Persistent embedding rows (the L2 cache tier).

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

use super::memory_crud::OptionalRow;
use super::vector_search::{blob_to_vector, vector_to_blob};

pub fn put_embedding(
    conn: &Connection,
    memory_id: &str,
    provider: &str,
    vector: &[f32],
) -> CortexResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO embeddings (memory_id, provider, dim, vector) VALUES (?1, ?2, ?3, ?4)",
        params![memory_id, provider, vector.len() as i64, vector_to_blob(vector)],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_embedding(
    conn: &Connection,
    memory_id: &str,
    provider: &str,
) -> CortexResult<Option<Vec<f32>>> {
    let blob: Option<Vec<u8>> = conn
        .query_row(
            "SELECT vector FROM embeddings WHERE memory_id = ?1 AND provider = ?2",
            params![memory_id, provider],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(blob.map(|b| blob_to_vector(&b)))
}

/// Drop every provider's embedding for a memory (summary changed or memory
/// deleted).
pub fn delete_embeddings(conn: &Connection, memory_id: &str) -> CortexResult<()> {
    conn.execute(
        "DELETE FROM embeddings WHERE memory_id = ?1",
        params![memory_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
