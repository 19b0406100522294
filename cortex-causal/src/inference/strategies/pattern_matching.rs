//! Pattern matching: two memories linked to the same pattern id support
//! each other.

use std::collections::HashSet;

use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalRelation, EvidenceType};

use super::super::{InferenceStrategy, InferredEdge};

pub struct PatternMatching;

impl InferenceStrategy for PatternMatching {
    fn name(&self) -> &'static str {
        "pattern_matching"
    }

    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge> {
        let source_patterns: HashSet<&str> = memory
            .linked_patterns
            .iter()
            .map(|l| l.pattern_id.as_str())
            .collect();
        if source_patterns.is_empty() {
            return Vec::new();
        }

        let mut edges = Vec::new();
        for candidate in candidates {
            if candidate.id == memory.id {
                continue;
            }
            let shared: Vec<&str> = candidate
                .linked_patterns
                .iter()
                .map(|l| l.pattern_id.as_str())
                .filter(|id| source_patterns.contains(id))
                .collect();
            if shared.is_empty() {
                continue;
            }
            edges.push(InferredEdge::new(
                memory,
                candidate,
                CausalRelation::Supports,
                0.6,
                EvidenceType::Entity,
                format!("both linked to pattern {}", shared.join(", ")),
            ));
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::PatternLink;
    use test_fixtures::tribal;

    #[test]
    fn shared_pattern_supports() {
        let link = PatternLink {
            pattern_id: "pat_builder".to_string(),
            pattern_name: Some("builder".to_string()),
        };
        let mut a = tribal("builders make config readable");
        a.linked_patterns.push(link.clone());
        let mut b = tribal("we use builders for query construction");
        b.linked_patterns.push(link);

        let edges = PatternMatching.infer(&a, std::slice::from_ref(&b));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].relation, CausalRelation::Supports);
    }
}
