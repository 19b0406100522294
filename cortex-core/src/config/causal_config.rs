use serde::{Deserialize, Serialize};

use super::defaults;

/// Causal inference and traversal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CausalConfig {
    /// Temporal proximity window — candidates further apart are ignored (ms).
    pub max_time_difference_ms: i64,
    /// e-folding window for temporal confidence (ms).
    pub high_confidence_window_ms: i64,
    /// Base confidence for temporal-proximity inference.
    pub temporal_base_confidence: f64,
    /// Inferred edges below this confidence are dropped.
    pub inference_min_confidence: f64,
    /// Cosine threshold for semantic-similarity inference.
    pub semantic_similarity_threshold: f64,
    /// Jaccard threshold for entity-overlap inference.
    pub entity_overlap_threshold: f64,
    /// Default traversal depth bound.
    pub traversal_max_depth: usize,
    /// Default traversal node bound.
    pub traversal_max_nodes: usize,
}

impl Default for CausalConfig {
    fn default() -> Self {
        Self {
            max_time_difference_ms: defaults::DEFAULT_MAX_TIME_DIFFERENCE_MS,
            high_confidence_window_ms: defaults::DEFAULT_HIGH_CONFIDENCE_WINDOW_MS,
            temporal_base_confidence: defaults::DEFAULT_TEMPORAL_BASE_CONFIDENCE,
            inference_min_confidence: defaults::DEFAULT_INFERENCE_MIN_CONFIDENCE,
            semantic_similarity_threshold: defaults::DEFAULT_SEMANTIC_SIMILARITY_THRESHOLD,
            entity_overlap_threshold: defaults::DEFAULT_ENTITY_OVERLAP_THRESHOLD,
            traversal_max_depth: defaults::DEFAULT_TRAVERSAL_MAX_DEPTH,
            traversal_max_nodes: defaults::DEFAULT_TRAVERSAL_MAX_NODES,
        }
    }
}
