use chrono::{DateTime, Utc};

use crate::errors::CortexResult;
use crate::memory::{
    BaseMemory, ConstraintLink, MemoryPatch, MemoryQuery, MemoryType, PatternLink,
    RelationshipEdge, RelationshipType,
};
use crate::models::{CausalEdge, CausalRelation, MemorySummary, SessionSnapshot};

/// Full CRUD + archive + query + vector + bitemporal + relationships + links +
/// aggregation + maintenance over the memories table.
pub trait IMemoryStorage: Send + Sync {
    // --- CRUD ---
    /// Persist a new memory. Returns the canonical id.
    fn create(&self, memory: &BaseMemory) -> CortexResult<String>;
    fn get(&self, id: &str) -> CortexResult<Option<BaseMemory>>;
    /// Merge a partial update. Fails `MemoryNotFound` for unknown ids and
    /// `MemoryArchived` for archived memories.
    fn update(&self, id: &str, patch: &MemoryPatch) -> CortexResult<BaseMemory>;
    /// Hard delete. Incident causal edges are tombstoned, not removed.
    fn delete(&self, id: &str) -> CortexResult<()>;

    // --- Archival ---
    fn archive(&self, id: &str, reason: &str) -> CortexResult<()>;
    fn restore(&self, id: &str) -> CortexResult<()>;

    // --- Bulk ---
    fn create_bulk(&self, memories: &[BaseMemory]) -> CortexResult<usize>;
    fn get_bulk(&self, ids: &[String]) -> CortexResult<Vec<BaseMemory>>;
    /// Import with per-item outcomes: memories whose content hash already
    /// exists count as skipped, invalid items become errors, the rest land.
    fn import_bulk(&self, memories: &[BaseMemory])
        -> CortexResult<crate::models::BulkImportReport>;

    // --- Query ---
    fn search(&self, query: &MemoryQuery) -> CortexResult<Vec<BaseMemory>>;
    fn count(&self, query: &MemoryQuery) -> CortexResult<usize>;
    fn get_summaries(&self, query: &MemoryQuery) -> CortexResult<Vec<MemorySummary>>;
    /// Bitemporal point-in-time query: the then-latest non-superseded version
    /// of every record known at `system_time` and valid at `valid_time`.
    fn query_as_of(
        &self,
        system_time: DateTime<Utc>,
        valid_time: DateTime<Utc>,
    ) -> CortexResult<Vec<BaseMemory>>;

    // --- Search ---
    /// FTS5 keyword search over summaries and tags.
    fn search_text(&self, text: &str, limit: usize) -> CortexResult<Vec<BaseMemory>>;
    /// Cosine k-NN against stored embeddings. Ties break on confidence desc,
    /// then created_at desc.
    fn similarity_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> CortexResult<Vec<(BaseMemory, f64)>>;

    // --- Telemetry ---
    /// Bump access_count and last_accessed for the given ids.
    fn record_access(&self, ids: &[String]) -> CortexResult<()>;

    // --- Relationships & links ---
    fn add_relationship(&self, edge: &RelationshipEdge) -> CortexResult<()>;
    fn get_related(
        &self,
        memory_id: &str,
        rel_type: Option<RelationshipType>,
    ) -> CortexResult<Vec<RelationshipEdge>>;
    fn link_to_pattern(&self, memory_id: &str, link: &PatternLink) -> CortexResult<()>;
    fn link_to_constraint(&self, memory_id: &str, link: &ConstraintLink) -> CortexResult<()>;

    // --- Embedding persistence ---
    fn put_embedding(&self, memory_id: &str, provider: &str, vector: &[f32]) -> CortexResult<()>;
    fn get_embedding(&self, memory_id: &str, provider: &str) -> CortexResult<Option<Vec<f32>>>;
    fn delete_embeddings(&self, memory_id: &str) -> CortexResult<()>;

    // --- Aggregation ---
    fn count_by_type(&self) -> CortexResult<Vec<(MemoryType, usize)>>;
    fn average_confidence(&self) -> CortexResult<f64>;
    fn stale_count(&self, threshold_days: u64) -> CortexResult<usize>;

    // --- Maintenance ---
    fn vacuum(&self) -> CortexResult<()>;
}

/// Persistence for causal edges. Merge policy lives in the graph engine;
/// storage only enforces the `(source, target, relation)` uniqueness.
pub trait ICausalStorage: Send + Sync {
    fn insert_edge(&self, edge: &CausalEdge) -> CortexResult<()>;
    fn update_edge(&self, edge: &CausalEdge) -> CortexResult<()>;
    fn get_edge(
        &self,
        source_id: &str,
        target_id: &str,
        relation: CausalRelation,
    ) -> CortexResult<Option<CausalEdge>>;
    /// All live (non-tombstoned) edges touching a node, either direction.
    fn get_edges(&self, node_id: &str) -> CortexResult<Vec<CausalEdge>>;
    /// Live edges leaving a node.
    fn get_edges_from(&self, node_id: &str) -> CortexResult<Vec<CausalEdge>>;
    fn get_all_edges(&self, include_tombstoned: bool) -> CortexResult<Vec<CausalEdge>>;
    /// Mark every edge touching a memory as tombstoned. Returns the count.
    fn tombstone_edges(&self, memory_id: &str) -> CortexResult<usize>;
    fn edge_count(&self) -> CortexResult<usize>;
}

/// Persistence for session state.
pub trait ISessionStorage: Send + Sync {
    fn save_session(&self, snapshot: &SessionSnapshot) -> CortexResult<()>;
    fn load_session(&self, session_id: &str) -> CortexResult<Option<SessionSnapshot>>;
    fn load_open_sessions(&self) -> CortexResult<Vec<SessionSnapshot>>;
    /// Drop ended sessions older than the retention window. Returns the count.
    fn delete_ended_before(&self, cutoff: DateTime<Utc>) -> CortexResult<usize>;
    /// Append loaded-set rows with their token/level accounting.
    fn record_loaded(
        &self,
        session_id: &str,
        kind: crate::models::LoadedKind,
        target_id: &str,
        token_count: usize,
        compression_level: u8,
    ) -> CortexResult<()>;
}

/// Persistence for run history (consolidation + validation).
pub trait IRunStorage: Send + Sync {
    fn record_consolidation_run(
        &self,
        report: &crate::models::ConsolidationReport,
    ) -> CortexResult<()>;
    fn record_validation_run(
        &self,
        report: &crate::models::ValidationReport,
        healed: Option<&crate::models::HealingOutcome>,
    ) -> CortexResult<()>;
}
