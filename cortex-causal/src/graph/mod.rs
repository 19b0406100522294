//! Edge lifecycle: creation with normalization and DAG enforcement,
//! merge-on-conflict, inference application.

pub mod dag_enforcement;

use std::sync::Arc;

use cortex_core::errors::{CausalError, CortexResult};
use cortex_core::identity;
use cortex_core::models::{CausalEdge, CausalEvidence, CausalRelation};
use cortex_core::traits::{ICausalStorage, IMemoryStorage};
use cortex_core::CortexError;

use crate::inference::InferredEdge;

/// A request to create (or merge into) a causal edge.
#[derive(Debug, Clone)]
pub struct EdgeRequest {
    pub source_id: String,
    pub target_id: String,
    pub relation: CausalRelation,
    /// Clamped to [0, 1]; defaults to 0.5 when omitted.
    pub strength: Option<f64>,
    pub evidence: Vec<CausalEvidence>,
    pub inferred: bool,
    pub created_by: Option<String>,
}

impl EdgeRequest {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation: CausalRelation,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation,
            strength: None,
            evidence: Vec::new(),
            inferred: false,
            created_by: None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }
}

/// The causal graph engine over edge storage.
pub struct CausalGraph {
    edges: Arc<dyn ICausalStorage>,
    memories: Arc<dyn IMemoryStorage>,
}

impl CausalGraph {
    pub fn new(edges: Arc<dyn ICausalStorage>, memories: Arc<dyn IMemoryStorage>) -> Self {
        Self { edges, memories }
    }

    /// Edge storage handle, used by traversal.
    pub fn storage(&self) -> &dyn ICausalStorage {
        self.edges.as_ref()
    }

    /// Create an edge, or merge into an existing `(source, target, relation)`
    /// edge: evidence entries accumulate, strength takes the max. Rejects
    /// self-loops, missing endpoints, and supersedes cycles.
    pub fn create_edge(&self, request: EdgeRequest) -> CortexResult<CausalEdge> {
        if request.source_id == request.target_id {
            return Err(CortexError::CausalError(CausalError::SelfLoop {
                id: request.source_id,
            }));
        }
        for endpoint in [&request.source_id, &request.target_id] {
            if self.memories.get(endpoint)?.is_none() {
                return Err(CortexError::IntegrityViolation {
                    reason: format!("causal edge endpoint {endpoint} does not exist"),
                });
            }
        }
        if request.relation == CausalRelation::Supersedes
            && dag_enforcement::would_create_cycle(
                self.edges.as_ref(),
                &request.source_id,
                &request.target_id,
            )?
        {
            return Err(CortexError::CausalError(CausalError::CycleDetected {
                path: format!("{} -> {}", request.source_id, request.target_id),
            }));
        }

        let strength = request.strength.unwrap_or(0.5).clamp(0.0, 1.0);

        if let Some(mut existing) =
            self.edges
                .get_edge(&request.source_id, &request.target_id, request.relation)?
        {
            merge_into(&mut existing, strength, request.evidence, request.inferred);
            self.edges.update_edge(&existing)?;
            return Ok(existing);
        }

        let edge = CausalEdge {
            id: identity::new_edge_id(),
            source_id: request.source_id,
            target_id: request.target_id,
            relation: request.relation,
            strength,
            evidence: request.evidence,
            created_at: identity::monotonic_now(),
            validated_at: None,
            inferred: request.inferred,
            created_by: request.created_by,
            tombstone: false,
        };
        self.edges.insert_edge(&edge)?;
        Ok(edge)
    }

    /// Apply a batch of inferred edges. Per-edge failures are logged and
    /// skipped so one bad inference never sinks the batch.
    pub fn apply_inferred(&self, inferred: Vec<InferredEdge>) -> CortexResult<Vec<CausalEdge>> {
        let mut created = Vec::with_capacity(inferred.len());
        for edge in inferred {
            let request = EdgeRequest {
                source_id: edge.source_id,
                target_id: edge.target_id,
                relation: edge.relation,
                strength: Some(edge.confidence),
                evidence: vec![edge.evidence],
                inferred: true,
                created_by: None,
            };
            match self.create_edge(request) {
                Ok(edge) => created.push(edge),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping inferred edge");
                }
            }
        }
        Ok(created)
    }

    /// All live edges touching a memory.
    pub fn edges_for(&self, memory_id: &str) -> CortexResult<Vec<CausalEdge>> {
        self.edges.get_edges(memory_id)
    }

    /// Live `contradicts` edges leaving a memory.
    pub fn contradictions_from(&self, memory_id: &str) -> CortexResult<Vec<CausalEdge>> {
        Ok(self
            .edges
            .get_edges_from(memory_id)?
            .into_iter()
            .filter(|e| e.relation == CausalRelation::Contradicts)
            .collect())
    }
}

/// Merge policy for duplicate `(source, target, relation)` creations:
/// max strength, deduplicated evidence union, explicit beats inferred.
/// Commutative, so concurrent merges converge.
fn merge_into(
    existing: &mut CausalEdge,
    strength: f64,
    evidence: Vec<CausalEvidence>,
    inferred: bool,
) {
    existing.strength = existing.strength.max(strength);
    for entry in evidence {
        let duplicate = existing
            .evidence
            .iter()
            .any(|e| e.evidence_type == entry.evidence_type && e.description == entry.description);
        if !duplicate {
            existing.evidence.push(entry);
        }
    }
    existing.inferred = existing.inferred && inferred;
}
