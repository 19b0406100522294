//! Inference strategies: each looks at a memory and a candidate set and
//! proposes causal edges with evidence. Registration is a list of trait
//! objects; hosts can extend it.

pub mod strategies;

use std::sync::Arc;

use cortex_core::config::CausalConfig;
use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalEvidence, CausalRelation, EvidenceType};

use cortex_embeddings::EmbeddingCache;

/// An edge proposed by a strategy, not yet persisted.
#[derive(Debug, Clone)]
pub struct InferredEdge {
    pub source_id: String,
    pub target_id: String,
    pub relation: CausalRelation,
    pub confidence: f64,
    pub evidence: CausalEvidence,
}

impl InferredEdge {
    fn new(
        source: &BaseMemory,
        target: &BaseMemory,
        relation: CausalRelation,
        confidence: f64,
        evidence_type: EvidenceType,
        description: String,
    ) -> Self {
        Self {
            source_id: source.id.clone(),
            target_id: target.id.clone(),
            relation,
            confidence,
            evidence: CausalEvidence {
                evidence_type,
                description,
                confidence,
                detected_at: cortex_core::identity::monotonic_now(),
            },
        }
    }
}

/// A causal inference strategy.
pub trait InferenceStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge>;
}

/// The default strategy set, in evaluation order.
pub fn default_strategies(
    config: &CausalConfig,
    embeddings: Option<Arc<EmbeddingCache>>,
) -> Vec<Box<dyn InferenceStrategy>> {
    let mut set: Vec<Box<dyn InferenceStrategy>> = vec![
        Box::new(strategies::TemporalProximity::new(config)),
        Box::new(strategies::EntityOverlap::new(config)),
        Box::new(strategies::ExplicitReference::new()),
        Box::new(strategies::PatternMatching),
        Box::new(strategies::FileCoOccurrence),
    ];
    if let Some(cache) = embeddings {
        set.push(Box::new(strategies::SemanticSimilarity::new(config, cache)));
    }
    set
}

/// Run every strategy over a memory and candidate set.
pub fn infer_all(
    strategies: &[Box<dyn InferenceStrategy>],
    memory: &BaseMemory,
    candidates: &[BaseMemory],
) -> Vec<InferredEdge> {
    let mut edges = Vec::new();
    for strategy in strategies {
        let found = strategy.infer(memory, candidates);
        if !found.is_empty() {
            tracing::debug!(strategy = strategy.name(), count = found.len(), "inferred edges");
        }
        edges.extend(found);
    }
    edges
}
