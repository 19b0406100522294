//! Entity overlap: Jaccard over the union of linked files, patterns, and
//! constraints. High overlap means the later memory derives from the earlier.

use std::collections::HashSet;

use cortex_core::config::CausalConfig;
use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalRelation, EvidenceType};

use super::super::{InferenceStrategy, InferredEdge};

pub struct EntityOverlap {
    threshold: f64,
}

impl EntityOverlap {
    pub fn new(config: &CausalConfig) -> Self {
        Self {
            threshold: config.entity_overlap_threshold,
        }
    }

    fn entities(memory: &BaseMemory) -> HashSet<String> {
        let mut set = HashSet::new();
        for link in &memory.linked_files {
            set.insert(format!("file:{}", link.file_path));
        }
        for link in &memory.linked_patterns {
            set.insert(format!("pattern:{}", link.pattern_id));
        }
        for link in &memory.linked_constraints {
            set.insert(format!("constraint:{}", link.constraint_id));
        }
        set
    }

    fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
        let union = a.union(b).count();
        if union == 0 {
            return 0.0;
        }
        a.intersection(b).count() as f64 / union as f64
    }
}

impl InferenceStrategy for EntityOverlap {
    fn name(&self) -> &'static str {
        "entity_overlap"
    }

    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge> {
        let source_entities = Self::entities(memory);
        if source_entities.is_empty() {
            return Vec::new();
        }

        let mut edges = Vec::new();
        for candidate in candidates {
            if candidate.id == memory.id {
                continue;
            }
            let overlap = Self::jaccard(&source_entities, &Self::entities(candidate));
            if overlap < self.threshold {
                continue;
            }
            edges.push(InferredEdge::new(
                memory,
                candidate,
                CausalRelation::DerivedFrom,
                overlap,
                EvidenceType::Entity,
                format!("entity jaccard {overlap:.2}"),
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

    fn with_pattern(mut memory: BaseMemory, pattern_id: &str) -> BaseMemory {
        memory.linked_patterns.push(PatternLink {
            pattern_id: pattern_id.to_string(),
            pattern_name: None,
        });
        memory
    }

    #[test]
    fn shared_links_produce_derived_from() {
        let strategy = EntityOverlap::new(&CausalConfig::default());
        let a = with_pattern(tribal("uses the repository pattern"), "pat_repo");
        let b = with_pattern(tribal("repositories wrap the data layer"), "pat_repo");

        let edges = strategy.infer(&a, std::slice::from_ref(&b));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].relation, CausalRelation::DerivedFrom);
        assert!((edges[0].confidence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_links_means_no_edges() {
        let strategy = EntityOverlap::new(&CausalConfig::default());
        let a = tribal("unlinked one");
        let b = tribal("unlinked two");
        assert!(strategy.infer(&a, std::slice::from_ref(&b)).is_empty());
    }
}
