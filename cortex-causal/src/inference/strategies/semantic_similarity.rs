//! Semantic similarity: embedding cosine above threshold relates two
//! memories. Negation cues flip the relation from supports to contradicts.

use std::sync::Arc;

use cortex_core::config::CausalConfig;
use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalRelation, EvidenceType};

use cortex_embeddings::EmbeddingCache;

use super::super::{InferenceStrategy, InferredEdge};

/// Tokens that signal one statement negates what the other asserts.
const CONTRAST_CUES: [&str; 6] = ["not ", "never ", "avoid ", "don't ", "do not ", "no longer "];

pub struct SemanticSimilarity {
    threshold: f64,
    embeddings: Arc<EmbeddingCache>,
}

impl SemanticSimilarity {
    pub fn new(config: &CausalConfig, embeddings: Arc<EmbeddingCache>) -> Self {
        Self {
            threshold: config.semantic_similarity_threshold,
            embeddings,
        }
    }

    fn cosine(a: &[f32], b: &[f32]) -> f64 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let (mut dot, mut ma, mut mb) = (0.0f64, 0.0f64, 0.0f64);
        for (x, y) in a.iter().zip(b) {
            dot += (*x as f64) * (*y as f64);
            ma += (*x as f64) * (*x as f64);
            mb += (*y as f64) * (*y as f64);
        }
        if ma == 0.0 || mb == 0.0 {
            0.0
        } else {
            dot / (ma.sqrt() * mb.sqrt())
        }
    }

    /// One summary carries a negation cue the other lacks.
    fn contrasts(a: &str, b: &str) -> bool {
        let a_lower = a.to_lowercase();
        let b_lower = b.to_lowercase();
        CONTRAST_CUES
            .iter()
            .any(|cue| a_lower.contains(cue) != b_lower.contains(cue))
    }
}

impl InferenceStrategy for SemanticSimilarity {
    fn name(&self) -> &'static str {
        "semantic_similarity"
    }

    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge> {
        if !self.embeddings.is_available() {
            return Vec::new();
        }
        let source_vector = match self.embeddings.embed_memory(memory) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "semantic inference skipped");
                return Vec::new();
            }
        };

        let mut edges = Vec::new();
        for candidate in candidates {
            if candidate.id == memory.id {
                continue;
            }
            let candidate_vector = match self.embeddings.embed_memory(candidate) {
                Ok(v) => v,
                Err(_) => continue,
            };
            let similarity = Self::cosine(&source_vector, &candidate_vector);
            if similarity < self.threshold {
                continue;
            }

            let relation = if Self::contrasts(&memory.summary, &candidate.summary) {
                CausalRelation::Contradicts
            } else {
                CausalRelation::Supports
            };
            edges.push(InferredEdge::new(
                memory,
                candidate,
                relation,
                similarity,
                EvidenceType::Semantic,
                format!("summary cosine similarity {similarity:.2}"),
            ));
        }
        edges
    }
}
