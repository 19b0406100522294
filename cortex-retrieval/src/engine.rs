//! The retrieval pipeline.

use std::sync::Arc;

use cortex_core::errors::CortexResult;
use cortex_core::memory::{BaseMemory, ConsolidationStatus, MemoryQuery, MemoryType};
use cortex_core::models::{MemorySummary, RetrievalResponse, RetrievedMemory};
use cortex_core::traits::{IMemoryStorage, ITokenEstimator};
use cortex_core::CortexError;

use cortex_embeddings::EmbeddingCache;
use cortex_session::SessionManager;

use crate::options::SearchOptions;

/// Over-fetch factor before post-filtering trims to the limit.
const CANDIDATE_FACTOR: usize = 3;

pub struct RetrievalEngine {
    storage: Arc<dyn IMemoryStorage>,
    embeddings: Option<Arc<EmbeddingCache>>,
    sessions: Arc<SessionManager>,
    estimator: Arc<dyn ITokenEstimator>,
}

impl RetrievalEngine {
    pub fn new(
        storage: Arc<dyn IMemoryStorage>,
        embeddings: Option<Arc<EmbeddingCache>>,
        sessions: Arc<SessionManager>,
        estimator: Arc<dyn ITokenEstimator>,
    ) -> Self {
        Self {
            storage,
            embeddings,
            sessions,
            estimator,
        }
    }

    /// Natural-language search. Semantic when a provider is configured and
    /// available; FTS/filter fallback otherwise. Results come back as
    /// summaries with session annotations.
    pub fn search(&self, query: &str, options: &SearchOptions) -> CortexResult<RetrievalResponse> {
        if let Some(session_id) = &options.session_id {
            self.sessions.record_query(session_id)?;
        }

        let fetch = options.limit.max(1) * CANDIDATE_FACTOR;
        let (candidates, degraded) = self.fetch_candidates(query, fetch, options)?;

        let mut filtered = apply_filters(candidates, options);
        if filtered.is_empty() {
            // Progressive broadening: drop the narrowest filter and retry
            // against the same candidate pool.
            for broadened in broaden(options) {
                let (candidates, _) = self.fetch_candidates(query, fetch, &broadened)?;
                filtered = apply_filters(candidates, &broadened);
                if !filtered.is_empty() {
                    break;
                }
            }
        }
        filtered.truncate(options.limit);

        self.finish(filtered, degraded, options)
    }

    /// Paginated listing by memory type.
    pub fn list_by_category(
        &self,
        memory_type: MemoryType,
        limit: usize,
        offset: usize,
    ) -> CortexResult<Vec<MemorySummary>> {
        self.storage.get_summaries(&MemoryQuery {
            types: Some(vec![memory_type]),
            limit: Some(limit),
            offset: Some(offset),
            ..Default::default()
        })
    }

    /// Paginated listing of episodic memories by consolidation status.
    pub fn list_by_status(
        &self,
        status: ConsolidationStatus,
        limit: usize,
        offset: usize,
    ) -> CortexResult<Vec<MemorySummary>> {
        self.storage.get_summaries(&MemoryQuery {
            types: Some(vec![MemoryType::Episodic]),
            consolidation_status: Some(status),
            include_archived: true,
            limit: Some(limit),
            offset: Some(offset),
            ..Default::default()
        })
    }

    /// Pattern ids cited by memories linked to a file.
    pub fn patterns_by_file(&self, file_path: &str) -> CortexResult<Vec<String>> {
        let memories = self.storage.search(&MemoryQuery::of_file(file_path))?;
        let mut patterns: Vec<String> = memories
            .iter()
            .flat_map(|m| m.linked_patterns.iter().map(|l| l.pattern_id.clone()))
            .collect();
        patterns.sort();
        patterns.dedup();
        Ok(patterns)
    }

    /// Full payload fetch, counted as an access.
    pub fn get_full(&self, id: &str) -> CortexResult<Option<BaseMemory>> {
        let memory = self.storage.get(id)?;
        if memory.is_some() {
            self.storage.record_access(&[id.to_string()])?;
        }
        Ok(memory)
    }

    /// Fetch scored candidates. Returns (candidates, degraded): `degraded`
    /// is true when the semantic path was requested but unavailable.
    fn fetch_candidates(
        &self,
        query: &str,
        fetch: usize,
        options: &SearchOptions,
    ) -> CortexResult<(Vec<(BaseMemory, Option<f64>)>, bool)> {
        if !query.trim().is_empty() {
            if let Some(embeddings) = &self.embeddings {
                match embeddings.embed_query(query) {
                    Ok(vector) => {
                        let scored = self.storage.similarity_search(&vector, fetch)?;
                        return Ok((
                            scored.into_iter().map(|(m, s)| (m, Some(s))).collect(),
                            false,
                        ));
                    }
                    Err(CortexError::ProviderUnavailable { name }) => {
                        tracing::debug!(provider = %name, "semantic search degraded to filter search");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "query embedding failed, degrading");
                    }
                }
            }

            let hits = self.storage.search_text(query, fetch)?;
            if !hits.is_empty() {
                let semantic_requested = self.embeddings.is_some();
                return Ok((
                    hits.into_iter().map(|m| (m, None)).collect(),
                    semantic_requested,
                ));
            }
        }

        // Pure filter search: no query text, or no keyword hits.
        let memories = self.storage.search(&MemoryQuery {
            types: options.types.clone(),
            min_confidence: options.min_confidence,
            importance: options.importance.clone(),
            include_archived: options.include_archived,
            limit: Some(fetch),
            ..Default::default()
        })?;
        let degraded = self.embeddings.is_some() && !query.trim().is_empty();
        Ok((memories.into_iter().map(|m| (m, None)).collect(), degraded))
    }

    /// Annotate, dedup, track, and project the final candidate list.
    fn finish(
        &self,
        candidates: Vec<(BaseMemory, Option<f64>)>,
        degraded: bool,
        options: &SearchOptions,
    ) -> CortexResult<RetrievalResponse> {
        let mut results = Vec::with_capacity(candidates.len());
        let mut deduplicated = 0usize;
        let mut tokens_saved = 0usize;
        let mut sent_ids: Vec<String> = Vec::new();

        let session = options
            .session_id
            .as_ref()
            .and_then(|id| self.sessions.get_session(id));

        for (memory, similarity) in candidates {
            let already_sent = session
                .as_ref()
                .map(|s| s.is_memory_sent(&memory.id))
                .unwrap_or(false);

            if already_sent && options.exclude_already_sent {
                deduplicated += 1;
                tokens_saved += self.estimator.estimate(&memory.summary);
                continue;
            }

            sent_ids.push(memory.id.clone());
            results.push(RetrievedMemory {
                summary: MemorySummary::from(&memory),
                similarity,
                already_sent,
            });
        }

        if !sent_ids.is_empty() {
            self.storage.record_access(&sent_ids)?;
        }

        if let Some(session_id) = &options.session_id {
            self.sessions.record_dedup(
                session_id,
                results.len() + deduplicated,
                deduplicated,
                tokens_saved,
            )?;
            if options.track_in_session {
                // Tracked at the summary level; compression may upgrade later.
                let sent: Vec<(String, usize, u8)> = results
                    .iter()
                    .map(|r| {
                        (
                            r.summary.id.clone(),
                            self.estimator.estimate(&r.summary.summary),
                            1u8,
                        )
                    })
                    .collect();
                self.sessions.track_memories_sent(session_id, &sent)?;
            }
        }

        Ok(RetrievalResponse {
            results,
            deduplicated,
            degraded,
        })
    }
}

/// Post-hoc filters over fetched candidates.
fn apply_filters(
    candidates: Vec<(BaseMemory, Option<f64>)>,
    options: &SearchOptions,
) -> Vec<(BaseMemory, Option<f64>)> {
    candidates
        .into_iter()
        .filter(|(m, _)| {
            if !options.include_archived && m.archived {
                return false;
            }
            if let Some(types) = &options.types {
                if !types.contains(&m.memory_type) {
                    return false;
                }
            }
            if let Some(min) = options.min_confidence {
                if m.confidence.value() < min {
                    return false;
                }
            }
            if let Some(importance) = &options.importance {
                if !importance.contains(&m.importance) {
                    return false;
                }
            }
            true
        })
        .collect()
}

/// The broadening ladder: drop importance, then confidence, then types.
fn broaden(options: &SearchOptions) -> Vec<SearchOptions> {
    let mut steps = Vec::new();
    let mut current = options.clone();
    if current.importance.is_some() {
        current.importance = None;
        steps.push(current.clone());
    }
    if current.min_confidence.is_some() {
        current.min_confidence = None;
        steps.push(current.clone());
    }
    if current.types.is_some() {
        current.types = None;
        steps.push(current);
    }
    steps
}
