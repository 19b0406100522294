//! Lightweight projections returned by retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::{BaseMemory, Importance, MemoryType};

/// The default retrieval projection — everything L0/L1 needs, nothing more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySummary {
    pub id: String,
    pub memory_type: MemoryType,
    pub summary: String,
    pub confidence: f64,
    pub importance: Importance,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
}

impl From<&BaseMemory> for MemorySummary {
    fn from(memory: &BaseMemory) -> Self {
        Self {
            id: memory.id.clone(),
            memory_type: memory.memory_type,
            summary: memory.summary.clone(),
            confidence: memory.confidence.value(),
            importance: memory.importance,
            created_at: memory.created_at,
            last_accessed: memory.last_accessed,
            access_count: memory.access_count,
        }
    }
}

/// A retrieval candidate with session annotations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedMemory {
    #[serde(flatten)]
    pub summary: MemorySummary,
    /// Cosine similarity when the query was semantic.
    pub similarity: Option<f64>,
    /// True when the session already received this memory.
    pub already_sent: bool,
}

/// A full retrieval response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub results: Vec<RetrievedMemory>,
    /// Count of candidates removed because the session had them already.
    pub deduplicated: usize,
    /// True when the semantic path degraded to filter search.
    pub degraded: bool,
}
