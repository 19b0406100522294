//! Explicit reference: `#id` tokens in the summary or payload text point
//! straight at another memory.

use regex::Regex;

use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalRelation, EvidenceType};

use super::super::{InferenceStrategy, InferredEdge};

pub struct ExplicitReference {
    pattern: Regex,
}

impl ExplicitReference {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"#([A-Za-z0-9_]+)").expect("reference regex is valid"),
        }
    }

    /// Summary plus serialized payload, the full searchable text.
    fn searchable_text(memory: &BaseMemory) -> String {
        let payload = serde_json::to_string(&memory.content).unwrap_or_default();
        format!("{} {payload}", memory.summary)
    }
}

impl Default for ExplicitReference {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceStrategy for ExplicitReference {
    fn name(&self) -> &'static str {
        "explicit_reference"
    }

    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge> {
        let text = Self::searchable_text(memory);
        let referenced: std::collections::HashSet<&str> = self
            .pattern
            .captures_iter(&text)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();
        if referenced.is_empty() {
            return Vec::new();
        }

        candidates
            .iter()
            .filter(|c| c.id != memory.id && referenced.contains(c.id.as_str()))
            .map(|candidate| {
                InferredEdge::new(
                    memory,
                    candidate,
                    CausalRelation::DerivedFrom,
                    0.9,
                    EvidenceType::Explicit,
                    format!("summary references #{}", candidate.id),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_fixtures::tribal;

    #[test]
    fn hash_reference_links_to_candidate() {
        let strategy = ExplicitReference::new();
        let target = tribal("the referenced decision");
        let mut source = tribal("builds on earlier work");
        source.summary = format!("builds on #{}", target.id);

        let edges = strategy.infer(&source, std::slice::from_ref(&target));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].relation, CausalRelation::DerivedFrom);
        assert_eq!(edges[0].target_id, target.id);
    }

    #[test]
    fn unreferenced_candidates_stay_unlinked() {
        let strategy = ExplicitReference::new();
        let target = tribal("unrelated memory");
        let source = tribal("mentions nothing");
        assert!(strategy.infer(&source, std::slice::from_ref(&target)).is_empty());
    }
}
