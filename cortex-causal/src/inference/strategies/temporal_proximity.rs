//! Temporal proximity: memories close in transaction time are likely
//! causally related. Confidence decays exponentially with the gap.

use cortex_core::config::CausalConfig;
use cortex_core::memory::{BaseMemory, MemoryType};
use cortex_core::models::{CausalRelation, EvidenceType};

use super::super::{InferenceStrategy, InferredEdge};

pub struct TemporalProximity {
    max_time_difference_ms: i64,
    high_confidence_window_ms: i64,
    base_confidence: f64,
    min_confidence: f64,
}

impl TemporalProximity {
    pub fn new(config: &CausalConfig) -> Self {
        Self {
            max_time_difference_ms: config.max_time_difference_ms,
            high_confidence_window_ms: config.high_confidence_window_ms,
            base_confidence: config.temporal_base_confidence,
            min_confidence: config.inference_min_confidence,
        }
    }

    /// Pick the relation from the pair's types and ordering.
    fn relation_for(memory: &BaseMemory, candidate: &BaseMemory) -> CausalRelation {
        let candidate_earlier = candidate.transaction_time < memory.transaction_time;
        if memory.memory_type == candidate.memory_type {
            return if candidate_earlier {
                CausalRelation::DerivedFrom
            } else {
                CausalRelation::Supports
            };
        }
        match candidate.memory_type {
            MemoryType::Episodic => CausalRelation::TriggeredBy,
            MemoryType::PatternRationale => CausalRelation::Enabled,
            _ if candidate_earlier => CausalRelation::Caused,
            _ => CausalRelation::Supports,
        }
    }
}

impl InferenceStrategy for TemporalProximity {
    fn name(&self) -> &'static str {
        "temporal_proximity"
    }

    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge> {
        let mut edges = Vec::new();
        for candidate in candidates {
            if candidate.id == memory.id {
                continue;
            }
            let delta_ms = (memory.transaction_time - candidate.transaction_time)
                .num_milliseconds()
                .abs();
            if delta_ms > self.max_time_difference_ms {
                continue;
            }

            let confidence = self.base_confidence
                * (-(delta_ms as f64) / self.high_confidence_window_ms as f64).exp();
            if confidence < self.min_confidence {
                continue;
            }

            let relation = Self::relation_for(memory, candidate);
            edges.push(InferredEdge::new(
                memory,
                candidate,
                relation,
                confidence,
                EvidenceType::Temporal,
                format!("created {}s apart", delta_ms / 1000),
            ));
        }
        edges
    }
}
