//! Contradiction validation: live `contradicts` edges leaving a memory.

use cortex_core::errors::CortexResult;
use cortex_core::memory::BaseMemory;
use cortex_core::models::{CausalRelation, IssueSeverity, ValidationDimension, ValidationIssue};
use cortex_core::traits::ICausalStorage;

pub fn validate(
    edges: &dyn ICausalStorage,
    memory: &BaseMemory,
) -> CortexResult<Vec<ValidationIssue>> {
    let issues = edges
        .get_edges_from(&memory.id)?
        .into_iter()
        .filter(|e| e.relation == CausalRelation::Contradicts)
        .map(|e| ValidationIssue {
            dimension: ValidationDimension::Contradiction,
            kind: ValidationIssue::CONTRADICTION_ACTIVE.to_string(),
            severity: IssueSeverity::Moderate,
            description: format!("contradicts {}", e.target_id),
            citation_index: None,
        })
        .collect();
    Ok(issues)
}
