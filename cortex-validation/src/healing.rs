//! Automatic repair. Citation drift and temporal staleness heal; active
//! contradictions and pattern misalignment need a human.

use std::path::Path;

use cortex_core::errors::CortexResult;
use cortex_core::identity;
use cortex_core::memory::{BaseMemory, MemoryPatch};
use cortex_core::models::{HealingAction, HealingOutcome, ValidationIssue, ValidationReport};
use cortex_core::traits::IMemoryStorage;

use crate::citation_hash;

/// Confidence bump applied when staleness heals (the memory was looked at
/// and is still good).
const HEAL_CONFIDENCE_BONUS: f64 = 0.05;

/// Attempt to repair the issues in a report. Returns what was done and what
/// was skipped; the repaired memory is persisted through the store.
pub fn heal(
    root: &Path,
    storage: &dyn IMemoryStorage,
    memory: &BaseMemory,
    report: &ValidationReport,
) -> CortexResult<HealingOutcome> {
    let now = identity::monotonic_now();
    let mut actions = Vec::new();
    let mut skipped = Vec::new();

    let mut citations = memory.linked_files.clone();
    let mut rehashed = false;
    let mut refresh_temporal = false;

    for issue in &report.issues {
        match issue.kind.as_str() {
            ValidationIssue::CITATION_DRIFT => {
                let Some(index) = issue.citation_index else {
                    continue;
                };
                let Some(citation) = citations.get_mut(index) else {
                    continue;
                };
                match citation_hash::hash_region(root, citation) {
                    Ok(current) => {
                        citation.hash = current;
                        citation.validated_at = Some(now);
                        citation.valid = Some(true);
                        rehashed = true;
                        actions.push(HealingAction::CitationRehashed {
                            citation_index: index,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(memory_id = %memory.id, error = %e, "rehash failed");
                        skipped.push(issue.kind.clone());
                    }
                }
            }
            ValidationIssue::TEMPORAL_STALE => {
                refresh_temporal = true;
                actions.push(HealingAction::TemporalRefreshed);
            }
            other => skipped.push(other.to_string()),
        }
    }

    if rehashed || refresh_temporal {
        let patch = MemoryPatch {
            linked_files: rehashed.then_some(citations),
            last_validated: Some(now),
            confidence: refresh_temporal
                .then(|| memory.confidence.adjusted(HEAL_CONFIDENCE_BONUS).value()),
            ..Default::default()
        };
        storage.update(&memory.id, &patch)?;
    }

    Ok(HealingOutcome {
        memory_id: memory.id.clone(),
        actions,
        healed_at: now,
        skipped,
    })
}
