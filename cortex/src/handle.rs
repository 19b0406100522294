//! Construction, wiring, background task lifetime, and the operation
//! surface.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use cortex_causal::{inference, CausalGraph, EdgeRequest, InferenceStrategy, TraversalOptions};
use cortex_compression::{CompressOptions, INeighborhoodSource, MemoryNeighborhood};
use cortex_consolidation::{ConsolidationEngine, SchedulerHandle};
use cortex_core::config::CortexConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{
    BaseMemory, MemoryPatch, MemoryQuery, MemoryType, OrderBy, OrderDir, TypedContent,
};
use cortex_core::models::{
    CausalChain, CausalEdge, CompressedMemory, CompressionResult, ConsolidationReport,
    DecayReport, FeedbackStats, GenerationContext, MemoryOutcome, RetrievalResponse, SessionStats,
    ValidationReport,
};
use cortex_core::traits::{
    ICausalStorage, IEmbeddingProvider, IMemoryStorage, IPatternResolver, IRunStorage,
    ITokenEstimator, NullResolver,
};
use cortex_decay::{DecayEngine, FeedbackProcessor};
use cortex_embeddings::{EmbeddingCache, Preloader, PreloaderHandle};
use cortex_retrieval::{RetrievalEngine, SearchOptions};
use cortex_session::{analytics, SessionManager};
use cortex_storage::StorageEngine;
use cortex_tokens::TokenCounter;
use cortex_validation::ValidationEngine;

/// How many recent memories inference considers when a memory is created.
const INFERENCE_CANDIDATE_WINDOW: usize = 50;

/// Bounds for the causal chain shipped in L3 projections — enough context
/// to orient a consumer, small enough to stay under the L3 ceiling.
const L3_CHAIN_DEPTH: usize = 3;
const L3_CHAIN_NODES: usize = 25;

/// Builder for a `Cortex` handle.
pub struct CortexBuilder {
    config: CortexConfig,
    provider: Option<Arc<dyn IEmbeddingProvider>>,
    resolver: Arc<dyn IPatternResolver>,
    estimator: Option<Arc<dyn ITokenEstimator>>,
    project_root: PathBuf,
}

impl CortexBuilder {
    pub fn new(config: CortexConfig) -> Self {
        Self {
            config,
            provider: None,
            resolver: Arc::new(NullResolver),
            estimator: None,
            project_root: PathBuf::from("."),
        }
    }

    /// Attach an embedding provider. Without one, semantic search degrades
    /// to filter search and semantic inference is skipped.
    pub fn embedding_provider(mut self, provider: Arc<dyn IEmbeddingProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn pattern_resolver(mut self, resolver: Arc<dyn IPatternResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn token_estimator(mut self, estimator: Arc<dyn ITokenEstimator>) -> Self {
        self.estimator = estimator.into();
        self
    }

    /// Root that citation paths are relative to. Defaults to the cwd.
    pub fn project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn build(self) -> CortexResult<Cortex> {
        Cortex::initialize(self)
    }
}

/// Background tasks owned by the handle.
struct BackgroundTasks {
    scheduler: Option<SchedulerHandle>,
    preloader: Option<PreloaderHandle>,
}

/// Supplies L3 neighborhoods from the relationship table, the supersession
/// chain, and a bounded causal traversal. Lookup failures degrade to an
/// empty section rather than failing the projection.
struct NeighborhoodLookup {
    storage: Arc<dyn IMemoryStorage>,
    edges: Arc<dyn ICausalStorage>,
}

impl INeighborhoodSource for NeighborhoodLookup {
    fn neighborhood(&self, memory: &BaseMemory) -> MemoryNeighborhood {
        let mut related: Vec<String> = Vec::new();
        match self.storage.get_related(&memory.id, None) {
            Ok(edges) => {
                for edge in edges {
                    let other = if edge.source_id == memory.id {
                        edge.target_id
                    } else {
                        edge.source_id
                    };
                    if !related.contains(&other) {
                        related.push(other);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(memory_id = %memory.id, error = %e, "related lookup failed");
            }
        }
        for neighbor in [&memory.supersedes, &memory.superseded_by]
            .into_iter()
            .flatten()
        {
            if !related.contains(neighbor) {
                related.push(neighbor.clone());
            }
        }

        let causal_chain = match cortex_causal::traversal::traverse(
            self.edges.as_ref(),
            &memory.id,
            &TraversalOptions {
                max_depth: L3_CHAIN_DEPTH,
                max_nodes: L3_CHAIN_NODES,
                ..Default::default()
            },
        ) {
            Ok(chain) => chain.nodes.into_iter().map(|n| n.memory_id).collect(),
            Err(e) => {
                tracing::warn!(memory_id = %memory.id, error = %e, "causal chain lookup failed");
                Vec::new()
            }
        };

        MemoryNeighborhood {
            related_memories: related,
            causal_chain,
        }
    }
}

/// The engine handle. Cloneable via `Arc`; all operations take `&self`.
pub struct Cortex {
    config: CortexConfig,
    storage: Arc<StorageEngine>,
    sessions: Arc<SessionManager>,
    embeddings: Option<Arc<EmbeddingCache>>,
    preloader: Option<Arc<Preloader>>,
    retrieval: RetrievalEngine,
    graph: Arc<CausalGraph>,
    strategies: Vec<Box<dyn InferenceStrategy>>,
    validation: ValidationEngine,
    decay: DecayEngine,
    feedback: FeedbackProcessor,
    consolidation: Arc<ConsolidationEngine>,
    estimator: Arc<dyn ITokenEstimator>,
    neighborhoods: NeighborhoodLookup,
    tasks: Mutex<Option<BackgroundTasks>>,
}

impl Cortex {
    /// Start building a handle.
    pub fn builder(config: CortexConfig) -> CortexBuilder {
        CortexBuilder::new(config)
    }

    /// An in-memory handle with defaults, for tests and ephemeral hosts.
    pub fn in_memory() -> CortexResult<Self> {
        CortexBuilder::new(CortexConfig::in_memory()).build()
    }

    fn initialize(builder: CortexBuilder) -> CortexResult<Self> {
        let config = builder.config;

        let storage = Arc::new(match &config.db_path {
            Some(path) => StorageEngine::open(path)?,
            None => StorageEngine::open_in_memory()?,
        });
        let memory_storage: Arc<dyn IMemoryStorage> = Arc::clone(&storage) as _;

        let estimator: Arc<dyn ITokenEstimator> = builder
            .estimator
            .unwrap_or_else(|| Arc::new(TokenCounter::new()));

        let embeddings = builder.provider.map(|provider| {
            Arc::new(EmbeddingCache::new(provider, Arc::clone(&memory_storage)))
        });

        let preloader = embeddings.as_ref().map(|cache| {
            Arc::new(Preloader::new(
                config.preloader.clone(),
                Arc::clone(cache),
                Arc::clone(&memory_storage),
            ))
        });

        let sessions = Arc::new(SessionManager::with_persistence(
            config.session.clone(),
            Arc::clone(&storage) as _,
        )?);

        let retrieval = RetrievalEngine::new(
            Arc::clone(&memory_storage),
            embeddings.clone(),
            Arc::clone(&sessions),
            Arc::clone(&estimator),
        );

        let graph = Arc::new(CausalGraph::new(
            Arc::clone(&storage) as _,
            Arc::clone(&memory_storage),
        ));
        let strategies = inference::default_strategies(&config.causal, embeddings.clone());

        let validation = ValidationEngine::new(
            builder.project_root,
            Arc::clone(&memory_storage),
            Arc::clone(&storage) as _,
            builder.resolver,
        );

        let decay = DecayEngine::new(Arc::clone(&memory_storage), config.decay.clone());
        let feedback = FeedbackProcessor::new(Arc::clone(&memory_storage));

        let consolidation = Arc::new(ConsolidationEngine::new(
            Arc::clone(&memory_storage),
            Arc::clone(&storage) as Arc<dyn IRunStorage>,
            Arc::clone(&graph),
            config.consolidation.clone(),
        ));

        let neighborhoods = NeighborhoodLookup {
            storage: Arc::clone(&memory_storage),
            edges: Arc::clone(&storage) as Arc<dyn ICausalStorage>,
        };

        tracing::info!(
            db = ?config.db_path,
            semantic = embeddings.is_some(),
            "cortex initialized"
        );

        Ok(Self {
            config,
            storage,
            sessions,
            embeddings,
            preloader,
            retrieval,
            graph,
            strategies,
            validation,
            decay,
            feedback,
            consolidation,
            estimator,
            neighborhoods,
            tasks: Mutex::new(None),
        })
    }

    /// Spawn the consolidation scheduler and the embedding preloader.
    /// Requires a tokio runtime. Idempotent.
    pub fn start_background_tasks(&self) {
        let mut tasks = self.tasks.lock().expect("task registry poisoned");
        if tasks.is_some() {
            return;
        }
        let scheduler = self.config.consolidation.enabled.then(|| {
            SchedulerHandle::spawn(
                Arc::clone(&self.consolidation),
                self.config.consolidation.schedule_interval_ms,
            )
        });
        let preloader = self
            .preloader
            .as_ref()
            .filter(|_| self.config.preloader.background_preload)
            .map(|p| Arc::clone(p).spawn());
        *tasks = Some(BackgroundTasks {
            scheduler,
            preloader,
        });
    }

    /// Stop background tasks and flush state. The handle is unusable for
    /// background work afterwards; foreground operations still function.
    pub async fn shutdown(&self) {
        let taken = self.tasks.lock().expect("task registry poisoned").take();
        if let Some(tasks) = taken {
            if let Some(scheduler) = tasks.scheduler {
                scheduler.shutdown().await;
            }
            if let Some(preloader) = tasks.preloader {
                preloader.shutdown().await;
            }
        }
        tracing::info!("cortex shut down");
    }

    // --- Memory CRUD ---

    /// Record a new memory. Causal links are inferred against the most
    /// recent memories; inference failures never fail the write.
    pub fn remember(&self, content: TypedContent, summary: impl Into<String>) -> CortexResult<String> {
        let memory = BaseMemory::new(content, summary)?;
        let id = self.storage.create(&memory)?;
        if let Err(e) = self.infer_links(&id) {
            tracing::warn!(memory_id = %id, error = %e, "inference on create failed");
        }
        Ok(id)
    }

    /// Insert a fully-formed memory (caller controls telemetry and links).
    pub fn insert(&self, memory: &BaseMemory) -> CortexResult<String> {
        self.storage.create(memory)
    }

    /// Bulk import with per-item outcomes; duplicate content hashes are
    /// skipped rather than failed.
    pub fn import(
        &self,
        memories: &[BaseMemory],
    ) -> CortexResult<cortex_core::models::BulkImportReport> {
        self.storage.import_bulk(memories)
    }

    pub fn get(&self, id: &str) -> CortexResult<Option<BaseMemory>> {
        self.storage.get(id)
    }

    pub fn update(&self, id: &str, patch: &MemoryPatch) -> CortexResult<BaseMemory> {
        self.storage.update(id, patch)
    }

    pub fn delete(&self, id: &str) -> CortexResult<()> {
        self.storage.delete(id)
    }

    pub fn archive(&self, id: &str, reason: &str) -> CortexResult<()> {
        self.storage.archive(id, reason)
    }

    pub fn restore(&self, id: &str) -> CortexResult<()> {
        self.storage.restore(id)
    }

    // --- Retrieval ---

    pub fn search(&self, query: &str, options: &SearchOptions) -> CortexResult<RetrievalResponse> {
        self.retrieval.search(query, options)
    }

    pub fn query(&self, query: &MemoryQuery) -> CortexResult<Vec<BaseMemory>> {
        self.storage.search(query)
    }

    pub fn query_as_of(
        &self,
        system_time: chrono::DateTime<chrono::Utc>,
        valid_time: chrono::DateTime<chrono::Utc>,
    ) -> CortexResult<Vec<BaseMemory>> {
        self.storage.query_as_of(system_time, valid_time)
    }

    /// Queue predicted ids for background embedding.
    pub fn preload(&self, ids: &[String]) -> usize {
        self.preloader.as_ref().map_or(0, |p| p.enqueue(ids))
    }

    /// Whether semantic search is live (provider configured and reachable).
    pub fn semantic_available(&self) -> bool {
        self.embeddings.as_ref().is_some_and(|e| e.is_available())
    }

    // --- Compression ---

    pub fn compress(
        &self,
        memory: &BaseMemory,
        options: &CompressOptions,
    ) -> CortexResult<CompressedMemory> {
        cortex_compression::compress(
            memory,
            options,
            self.estimator.as_ref(),
            &self.neighborhoods,
        )
    }

    pub fn compress_batch(
        &self,
        memories: &[BaseMemory],
        budget: usize,
    ) -> CortexResult<CompressionResult> {
        cortex_compression::compress_batch(
            memories,
            budget,
            &self.config.compression,
            self.estimator.as_ref(),
            &self.neighborhoods,
        )
    }

    // --- Causal graph ---

    pub fn add_causal_edge(&self, request: EdgeRequest) -> CortexResult<CausalEdge> {
        self.graph.create_edge(request)
    }

    /// Run the inference strategies for one memory against recent peers.
    pub fn infer_links(&self, id: &str) -> CortexResult<Vec<CausalEdge>> {
        let Some(memory) = self.storage.get(id)? else {
            return Err(cortex_core::CortexError::MemoryNotFound { id: id.to_string() });
        };
        let candidates = self.storage.search(&MemoryQuery {
            order_by: OrderBy::CreatedAt,
            order_dir: OrderDir::Desc,
            limit: Some(INFERENCE_CANDIDATE_WINDOW),
            ..Default::default()
        })?;
        let inferred = inference::infer_all(&self.strategies, &memory, &candidates);
        self.graph.apply_inferred(inferred)
    }

    pub fn traverse(&self, root: &str, options: &TraversalOptions) -> CortexResult<CausalChain> {
        cortex_causal::traversal::traverse(self.graph.storage(), root, options)
    }

    /// What would be affected if this memory were removed.
    pub fn counterfactual(&self, root: &str) -> CortexResult<CausalChain> {
        cortex_causal::traversal::counterfactual(
            self.graph.storage(),
            root,
            &TraversalOptions {
                max_depth: self.config.causal.traversal_max_depth,
                max_nodes: self.config.causal.traversal_max_nodes,
                ..Default::default()
            },
        )
    }

    // --- Sessions ---

    pub fn create_session(&self, metadata: Option<serde_json::Value>) -> CortexResult<String> {
        self.sessions.create_session(metadata)
    }

    pub fn track_memories_sent(
        &self,
        session_id: &str,
        sent: &[(String, usize, u8)],
    ) -> CortexResult<()> {
        self.sessions.track_memories_sent(session_id, sent)
    }

    pub fn end_session(&self, session_id: &str) -> CortexResult<SessionStats> {
        let ctx = self.sessions.end_session(session_id)?;
        Ok(analytics::session_stats(&ctx))
    }

    pub fn session_stats(&self, session_id: &str) -> Option<SessionStats> {
        self.sessions
            .get_session(session_id)
            .map(|ctx| analytics::session_stats(&ctx))
    }

    pub fn cleanup_sessions(&self) -> CortexResult<(usize, usize)> {
        self.sessions.cleanup()
    }

    // --- Validation / healing ---

    pub fn validate(&self, id: &str) -> CortexResult<ValidationReport> {
        let memory = self.require(id)?;
        Ok(self.validation.validate(&memory))
    }

    /// Validate, heal what can be healed, and record the run.
    pub fn validate_and_heal(&self, id: &str) -> CortexResult<ValidationReport> {
        let memory = self.require(id)?;
        let (report, outcome) = self.validation.validate_and_heal(&memory)?;
        self.storage
            .record_validation_run(&report, outcome.as_ref())?;
        Ok(report)
    }

    // --- Consolidation / decay / feedback ---

    pub fn run_consolidation(&self) -> CortexResult<ConsolidationReport> {
        self.consolidation.run()
    }

    pub fn apply_decay(&self) -> CortexResult<DecayReport> {
        self.decay.apply_decay()
    }

    /// Feed back what happened to generated output. Feedback lands before
    /// any decay pass in the same maintenance cycle.
    pub fn process_outcome(
        &self,
        generation: &GenerationContext,
        outcome: MemoryOutcome,
        feedback: Option<&str>,
    ) -> CortexResult<usize> {
        self.feedback.process_outcome(generation, outcome, feedback)
    }

    pub fn feedback_stats(&self) -> FeedbackStats {
        self.feedback.stats()
    }

    /// One maintenance pass: session cleanup, then decay. Outcome feedback
    /// is event-driven and has already been applied by the time this runs.
    pub fn maintenance_pass(&self) -> CortexResult<DecayReport> {
        self.sessions.cleanup()?;
        self.decay.apply_decay()
    }

    // --- Relationships & links ---

    pub fn add_relationship(
        &self,
        edge: &cortex_core::memory::RelationshipEdge,
    ) -> CortexResult<()> {
        self.storage.add_relationship(edge)
    }

    pub fn get_related(
        &self,
        memory_id: &str,
        rel_type: Option<cortex_core::memory::RelationshipType>,
    ) -> CortexResult<Vec<cortex_core::memory::RelationshipEdge>> {
        self.storage.get_related(memory_id, rel_type)
    }

    pub fn link_to_pattern(
        &self,
        memory_id: &str,
        link: &cortex_core::memory::PatternLink,
    ) -> CortexResult<()> {
        self.storage.link_to_pattern(memory_id, link)
    }

    pub fn link_to_constraint(
        &self,
        memory_id: &str,
        link: &cortex_core::memory::ConstraintLink,
    ) -> CortexResult<()> {
        self.storage.link_to_constraint(memory_id, link)
    }

    // --- Stats ---

    pub fn count(&self, query: &MemoryQuery) -> CortexResult<usize> {
        self.storage.count(query)
    }

    pub fn count_by_type(&self) -> CortexResult<Vec<(MemoryType, usize)>> {
        self.storage.count_by_type()
    }

    pub fn average_confidence(&self) -> CortexResult<f64> {
        self.storage.average_confidence()
    }

    fn require(&self, id: &str) -> CortexResult<BaseMemory> {
        self.storage
            .get(id)?
            .ok_or_else(|| cortex_core::CortexError::MemoryNotFound { id: id.to_string() })
    }
}
