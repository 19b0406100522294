//! File co-occurrence: two memories citing overlapping line ranges of the
//! same file are talking about the same code.

use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalRelation, EvidenceType};

use super::super::{InferenceStrategy, InferredEdge};

pub struct FileCoOccurrence;

impl InferenceStrategy for FileCoOccurrence {
    fn name(&self) -> &'static str {
        "file_co_occurrence"
    }

    fn infer(&self, memory: &BaseMemory, candidates: &[BaseMemory]) -> Vec<InferredEdge> {
        if memory.linked_files.is_empty() {
            return Vec::new();
        }

        let mut edges = Vec::new();
        for candidate in candidates {
            if candidate.id == memory.id {
                continue;
            }
            let overlapping = memory.linked_files.iter().find_map(|mine| {
                candidate
                    .linked_files
                    .iter()
                    .find(|theirs| mine.overlaps(theirs))
                    .map(|theirs| (mine, theirs))
            });
            if let Some((mine, _)) = overlapping {
                edges.push(InferredEdge::new(
                    memory,
                    candidate,
                    CausalRelation::DerivedFrom,
                    0.7,
                    EvidenceType::Entity,
                    format!(
                        "both cite {}:{}-{}",
                        mine.file_path, mine.line_start, mine.line_end
                    ),
                ));
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::Citation;
    use test_fixtures::tribal;

    fn cite(mut memory: BaseMemory, path: &str, start: u32, end: u32) -> BaseMemory {
        memory
            .linked_files
            .push(Citation::new(path, start, end, "abcd1234abcd1234".to_string()));
        memory
    }

    #[test]
    fn overlapping_ranges_link() {
        let a = cite(tribal("auth flow notes"), "src/auth.ts", 10, 30);
        let b = cite(tribal("token refresh notes"), "src/auth.ts", 25, 40);
        let edges = FileCoOccurrence.infer(&a, std::slice::from_ref(&b));
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].relation, CausalRelation::DerivedFrom);
    }

    #[test]
    fn disjoint_ranges_do_not_link() {
        let a = cite(tribal("header notes"), "src/auth.ts", 1, 5);
        let b = cite(tribal("footer notes"), "src/auth.ts", 100, 120);
        assert!(FileCoOccurrence.infer(&a, std::slice::from_ref(&b)).is_empty());
    }

    #[test]
    fn different_files_do_not_link() {
        let a = cite(tribal("auth notes"), "src/auth.ts", 10, 30);
        let b = cite(tribal("db notes"), "src/db.ts", 10, 30);
        assert!(FileCoOccurrence.infer(&a, std::slice::from_ref(&b)).is_empty());
    }
}
