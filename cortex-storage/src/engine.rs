//! StorageEngine — owns the ConnectionPool and implements IMemoryStorage,
//! ICausalStorage, ISessionStorage, and IRunStorage. All mutations serialize
//! through the single writer; reads go to the pool when file-backed.

use std::path::Path;

use chrono::{DateTime, Utc};

use cortex_core::errors::CortexResult;
use cortex_core::identity;
use cortex_core::memory::{
    BaseMemory, ConstraintLink, MemoryPatch, MemoryQuery, MemoryType, PatternLink,
    RelationshipEdge, RelationshipType,
};
use cortex_core::models::{
    BulkImportReport, CausalEdge, CausalRelation, ConsolidationReport, HealingOutcome,
    ImportError, LoadedKind, MemorySummary, SessionSnapshot, ValidationReport,
};
use cortex_core::traits::{ICausalStorage, IMemoryStorage, IRunStorage, ISessionStorage};
use cortex_core::CortexError;

use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries;

/// Longest supersession chain the cycle walk will follow before declaring
/// the data corrupt.
const MAX_SUPERSEDES_HOPS: usize = 256;

/// The main storage engine.
pub struct StorageEngine {
    pool: ConnectionPool,
}

impl StorageEngine {
    /// Open a storage engine backed by a file on disk.
    pub fn open(path: &Path) -> CortexResult<Self> {
        let pool = ConnectionPool::file_backed(path)?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Open an in-memory storage engine (tests, ephemeral hosts). All reads
    /// route through the writer since an in-memory read pool would see a
    /// different database.
    pub fn open_in_memory() -> CortexResult<Self> {
        let pool = ConnectionPool::ephemeral()?;
        let engine = Self { pool };
        engine.initialize()?;
        Ok(engine)
    }

    /// Run migrations and confirm the journal mode the read pool counts on.
    fn initialize(&self) -> CortexResult<()> {
        let has_readers = self.pool.readers.is_some();
        self.pool.writer.with_conn_sync(|conn| {
            migrations::run_migrations(conn)?;
            if has_readers && !crate::pool::pragmas::wal_active(conn)? {
                tracing::warn!("journal mode is not WAL; readers may block on the writer");
            }
            Ok(())
        })
    }

    /// Execute a read-only query on the best available connection.
    fn with_reader<F, T>(&self, f: F) -> CortexResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> CortexResult<T>,
    {
        match &self.pool.readers {
            Some(readers) => readers.read(f),
            None => self.pool.writer.with_conn_sync(f),
        }
    }

    /// Reject an update against a missing or archived memory.
    fn load_for_update(
        conn: &rusqlite::Connection,
        id: &str,
        operation: &str,
    ) -> CortexResult<BaseMemory> {
        let memory = queries::memory_crud::get_memory(conn, id)?
            .ok_or_else(|| CortexError::MemoryNotFound { id: id.to_string() })?;
        if memory.archived {
            return Err(CortexError::MemoryArchived {
                id: id.to_string(),
                operation: operation.to_string(),
            });
        }
        Ok(memory)
    }

    /// Enforce the supersedes DAG: setting `id.supersedes = predecessor` must
    /// not make `id` reachable from itself along the chain.
    fn check_supersedes_acyclic(
        conn: &rusqlite::Connection,
        id: &str,
        predecessor: &str,
    ) -> CortexResult<()> {
        if predecessor == id {
            return Err(CortexError::IntegrityViolation {
                reason: format!("memory {id} cannot supersede itself"),
            });
        }
        let mut cursor = Some(predecessor.to_string());
        let mut hops = 0;
        while let Some(current) = cursor {
            hops += 1;
            if hops > MAX_SUPERSEDES_HOPS {
                return Err(CortexError::IntegrityViolation {
                    reason: format!("supersedes chain from {predecessor} exceeds {MAX_SUPERSEDES_HOPS} hops"),
                });
            }
            let node = queries::memory_crud::get_memory(conn, &current)?.ok_or_else(|| {
                CortexError::IntegrityViolation {
                    reason: format!("supersedes target {current} does not exist"),
                }
            })?;
            if node.supersedes.as_deref() == Some(id) {
                return Err(CortexError::IntegrityViolation {
                    reason: format!("supersedes cycle between {id} and {current}"),
                });
            }
            cursor = node.supersedes;
        }
        Ok(())
    }
}

impl IMemoryStorage for StorageEngine {
    fn create(&self, memory: &BaseMemory) -> CortexResult<String> {
        memory.content.validate()?;
        memory.check_invariants()?;
        let id = memory.id.clone();
        self.pool.writer.with_conn_retry(|conn| {
            if let Some(predecessor) = &memory.supersedes {
                Self::check_supersedes_acyclic(conn, &memory.id, predecessor)?;
            }
            queries::memory_crud::insert_memory(conn, memory)
        })?;
        tracing::debug!(memory_id = %id, memory_type = %memory.memory_type, "created memory");
        Ok(id)
    }

    fn get(&self, id: &str) -> CortexResult<Option<BaseMemory>> {
        self.with_reader(|conn| queries::memory_crud::get_memory(conn, id))
    }

    fn update(&self, id: &str, patch: &MemoryPatch) -> CortexResult<BaseMemory> {
        self.pool.writer.with_conn_retry(|conn| {
            let mut memory = Self::load_for_update(conn, id, "update")?;
            let effect = patch.apply(&mut memory);
            memory.content.validate()?;
            memory.check_invariants()?;

            if let Some(Some(predecessor)) = &patch.supersedes {
                Self::check_supersedes_acyclic(conn, id, predecessor)?;
                // Keep the two-slot chain reciprocal.
                let mut pred = queries::memory_crud::get_memory(conn, predecessor)?
                    .ok_or_else(|| CortexError::IntegrityViolation {
                        reason: format!("supersedes target {predecessor} does not exist"),
                    })?;
                if pred.superseded_by.as_deref() != Some(id) {
                    pred.superseded_by = Some(id.to_string());
                    pred.updated_at = identity::monotonic_now();
                    queries::memory_crud::update_memory(conn, &pred)?;
                }
            }

            queries::memory_crud::update_memory(conn, &memory)?;

            // Summary drives the embedding; drop stale vectors.
            if effect.summary_changed {
                queries::embedding_ops::delete_embeddings(conn, id)?;
            }
            Ok(memory)
        })
    }

    fn delete(&self, id: &str) -> CortexResult<()> {
        self.pool.writer.with_conn_retry(|conn| {
            let tombstoned = queries::causal_ops::tombstone_edges(conn, id)?;
            queries::embedding_ops::delete_embeddings(conn, id)?;
            queries::memory_crud::delete_memory(conn, id)?;
            tracing::debug!(memory_id = %id, tombstoned, "deleted memory");
            Ok(())
        })
    }

    fn archive(&self, id: &str, reason: &str) -> CortexResult<()> {
        self.pool.writer.with_conn_retry(|conn| {
            let mut memory = queries::memory_crud::get_memory(conn, id)?
                .ok_or_else(|| CortexError::MemoryNotFound { id: id.to_string() })?;
            if memory.archived {
                return Ok(());
            }
            memory.archived = true;
            memory.archive_reason = Some(reason.to_string());
            memory.updated_at = identity::monotonic_now();
            queries::memory_crud::update_memory(conn, &memory)
        })
    }

    fn restore(&self, id: &str) -> CortexResult<()> {
        self.pool.writer.with_conn_retry(|conn| {
            let mut memory = queries::memory_crud::get_memory(conn, id)?
                .ok_or_else(|| CortexError::MemoryNotFound { id: id.to_string() })?;
            if !memory.archived {
                return Ok(());
            }
            memory.archived = false;
            memory.archive_reason = None;
            memory.updated_at = identity::monotonic_now();
            queries::memory_crud::update_memory(conn, &memory)
        })
    }

    fn create_bulk(&self, memories: &[BaseMemory]) -> CortexResult<usize> {
        for memory in memories {
            memory.content.validate()?;
        }
        self.pool
            .writer
            .with_conn_retry(|conn| queries::memory_crud::bulk_insert(conn, memories))
    }

    fn get_bulk(&self, ids: &[String]) -> CortexResult<Vec<BaseMemory>> {
        self.with_reader(|conn| queries::memory_crud::bulk_get(conn, ids))
    }

    fn import_bulk(&self, memories: &[BaseMemory]) -> CortexResult<BulkImportReport> {
        self.pool.writer.with_conn_retry(|conn| {
            let mut report = BulkImportReport::default();
            for memory in memories {
                match queries::memory_crud::find_by_content_hash(conn, &memory.content_hash)? {
                    Some(_) => report.skipped += 1,
                    None => {
                        let outcome = memory
                            .content
                            .validate()
                            .and_then(|()| memory.check_invariants())
                            .and_then(|()| queries::memory_crud::insert_memory(conn, memory));
                        match outcome {
                            Ok(()) => report.imported += 1,
                            Err(e) => report.errors.push(ImportError {
                                id: memory.id.clone(),
                                error: e.to_string(),
                            }),
                        }
                    }
                }
            }
            Ok(report)
        })
    }

    fn search(&self, query: &MemoryQuery) -> CortexResult<Vec<BaseMemory>> {
        self.with_reader(|conn| queries::memory_query::search(conn, query))
    }

    fn count(&self, query: &MemoryQuery) -> CortexResult<usize> {
        self.with_reader(|conn| queries::memory_query::count(conn, query))
    }

    fn get_summaries(&self, query: &MemoryQuery) -> CortexResult<Vec<MemorySummary>> {
        self.with_reader(|conn| queries::memory_query::get_summaries(conn, query))
    }

    fn query_as_of(
        &self,
        system_time: DateTime<Utc>,
        valid_time: DateTime<Utc>,
    ) -> CortexResult<Vec<BaseMemory>> {
        self.with_reader(|conn| queries::bitemporal::query_as_of(conn, system_time, valid_time))
    }

    fn search_text(&self, text: &str, limit: usize) -> CortexResult<Vec<BaseMemory>> {
        self.with_reader(|conn| queries::memory_search::search_text(conn, text, limit))
    }

    fn similarity_search(
        &self,
        vector: &[f32],
        k: usize,
    ) -> CortexResult<Vec<(BaseMemory, f64)>> {
        self.with_reader(|conn| queries::vector_search::similarity_search(conn, vector, k))
    }

    fn record_access(&self, ids: &[String]) -> CortexResult<()> {
        let now = identity::monotonic_now().to_rfc3339();
        self.pool
            .writer
            .with_conn_retry(|conn| queries::memory_crud::record_access(conn, ids, &now))
    }

    fn add_relationship(&self, edge: &RelationshipEdge) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::relationship_ops::add_relationship(conn, edge))
    }

    fn get_related(
        &self,
        memory_id: &str,
        rel_type: Option<RelationshipType>,
    ) -> CortexResult<Vec<RelationshipEdge>> {
        self.with_reader(|conn| queries::relationship_ops::get_related(conn, memory_id, rel_type))
    }

    fn link_to_pattern(&self, memory_id: &str, link: &PatternLink) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::link_ops::add_pattern_link(conn, memory_id, link))
    }

    fn link_to_constraint(&self, memory_id: &str, link: &ConstraintLink) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::link_ops::add_constraint_link(conn, memory_id, link))
    }

    fn put_embedding(&self, memory_id: &str, provider: &str, vector: &[f32]) -> CortexResult<()> {
        self.pool.writer.with_conn_retry(|conn| {
            queries::embedding_ops::put_embedding(conn, memory_id, provider, vector)
        })
    }

    fn get_embedding(&self, memory_id: &str, provider: &str) -> CortexResult<Option<Vec<f32>>> {
        self.with_reader(|conn| queries::embedding_ops::get_embedding(conn, memory_id, provider))
    }

    fn delete_embeddings(&self, memory_id: &str) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::embedding_ops::delete_embeddings(conn, memory_id))
    }

    fn count_by_type(&self) -> CortexResult<Vec<(MemoryType, usize)>> {
        self.with_reader(queries::aggregation::count_by_type)
    }

    fn average_confidence(&self) -> CortexResult<f64> {
        self.with_reader(queries::aggregation::average_confidence)
    }

    fn stale_count(&self, threshold_days: u64) -> CortexResult<usize> {
        self.with_reader(|conn| queries::aggregation::stale_count(conn, threshold_days))
    }

    fn vacuum(&self) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_sync(queries::maintenance::full_vacuum)
    }
}

impl ICausalStorage for StorageEngine {
    fn insert_edge(&self, edge: &CausalEdge) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::causal_ops::insert_edge(conn, edge))
    }

    fn update_edge(&self, edge: &CausalEdge) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::causal_ops::update_edge(conn, edge))
    }

    fn get_edge(
        &self,
        source_id: &str,
        target_id: &str,
        relation: CausalRelation,
    ) -> CortexResult<Option<CausalEdge>> {
        self.with_reader(|conn| queries::causal_ops::get_edge(conn, source_id, target_id, relation))
    }

    fn get_edges(&self, node_id: &str) -> CortexResult<Vec<CausalEdge>> {
        self.with_reader(|conn| queries::causal_ops::get_edges(conn, node_id))
    }

    fn get_edges_from(&self, node_id: &str) -> CortexResult<Vec<CausalEdge>> {
        self.with_reader(|conn| queries::causal_ops::get_edges_from(conn, node_id))
    }

    fn get_all_edges(&self, include_tombstoned: bool) -> CortexResult<Vec<CausalEdge>> {
        self.with_reader(|conn| queries::causal_ops::get_all_edges(conn, include_tombstoned))
    }

    fn tombstone_edges(&self, memory_id: &str) -> CortexResult<usize> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::causal_ops::tombstone_edges(conn, memory_id))
    }

    fn edge_count(&self) -> CortexResult<usize> {
        self.with_reader(queries::causal_ops::edge_count)
    }
}

impl ISessionStorage for StorageEngine {
    fn save_session(&self, snapshot: &SessionSnapshot) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::session_ops::save_session(conn, snapshot))
    }

    fn load_session(&self, session_id: &str) -> CortexResult<Option<SessionSnapshot>> {
        self.with_reader(|conn| queries::session_ops::load_session(conn, session_id))
    }

    fn load_open_sessions(&self) -> CortexResult<Vec<SessionSnapshot>> {
        self.with_reader(queries::session_ops::load_open_sessions)
    }

    fn delete_ended_before(&self, cutoff: DateTime<Utc>) -> CortexResult<usize> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::session_ops::delete_ended_before(conn, cutoff))
    }

    fn record_loaded(
        &self,
        session_id: &str,
        kind: LoadedKind,
        target_id: &str,
        token_count: usize,
        compression_level: u8,
    ) -> CortexResult<()> {
        self.pool.writer.with_conn_retry(|conn| {
            queries::session_ops::record_loaded(
                conn,
                session_id,
                kind,
                target_id,
                token_count,
                compression_level,
            )
        })
    }
}

impl IRunStorage for StorageEngine {
    fn record_consolidation_run(&self, report: &ConsolidationReport) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::run_ops::record_consolidation_run(conn, report))
    }

    fn record_validation_run(
        &self,
        report: &ValidationReport,
        healed: Option<&HealingOutcome>,
    ) -> CortexResult<()> {
        self.pool
            .writer
            .with_conn_retry(|conn| queries::run_ops::record_validation_run(conn, report, healed))
    }
}
