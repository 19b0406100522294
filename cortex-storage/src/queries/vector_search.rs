//! Cosine k-NN over the embeddings table.
//!
//! Vectors are stored as little-endian f32 blobs. The scan is linear; at the
//! scale of a per-project memory store that beats maintaining an ANN index.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::BaseMemory;

use crate::to_storage_err;

use super::memory_crud::get_memory;

/// Serialize an f32 vector to a little-endian blob.
pub fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    blob
}

/// Deserialize a little-endian blob back into an f32 vector.
pub fn blob_to_vector(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// Cosine similarity of two vectors. Zero-magnitude vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += (*x as f64) * (*y as f64);
        mag_a += (*x as f64) * (*x as f64);
        mag_b += (*y as f64) * (*y as f64);
    }
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a.sqrt() * mag_b.sqrt())
}

/// k-NN by cosine similarity. Archived memories are skipped. Ties break on
/// confidence desc, then created_at desc.
pub fn similarity_search(
    conn: &Connection,
    query_vector: &[f32],
    k: usize,
) -> CortexResult<Vec<(BaseMemory, f64)>> {
    let mut stmt = conn
        .prepare("SELECT memory_id, vector FROM embeddings")
        .map_err(|e| to_storage_err(e.to_string()))?;

    let scored = stmt
        .query_map(params![], |row| {
            let memory_id: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            Ok((memory_id, blob))
        })
        .map_err(|e| to_storage_err(e.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut results = Vec::new();
    for (memory_id, blob) in scored {
        let vector = blob_to_vector(&blob);
        let similarity = cosine_similarity(query_vector, &vector);
        if let Some(memory) = get_memory(conn, &memory_id)? {
            if memory.archived {
                continue;
            }
            results.push((memory, similarity));
        }
    }

    results.sort_by(|(ma, sa), (mb, sb)| {
        sb.partial_cmp(sa)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                mb.confidence
                    .value()
                    .partial_cmp(&ma.confidence.value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| mb.created_at.cmp(&ma.created_at))
    });
    results.truncate(k);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_round_trip() {
        let v = vec![0.5f32, -1.25, 3.0];
        assert_eq!(blob_to_vector(&vector_to_blob(&v)), v);
    }

    #[test]
    fn cosine_of_identical_is_one() {
        let v = vec![0.3f32, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_is_zero() {
        let a = vec![1.0f32, 0.0];
        let b = vec![0.0f32, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn cosine_handles_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }
}
