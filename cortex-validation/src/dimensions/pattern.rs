//! Pattern alignment, delegated to the host's resolver.

use cortex_core::memory::BaseMemory;
use cortex_core::models::{IssueSeverity, ValidationDimension, ValidationIssue};
use cortex_core::traits::IPatternResolver;

pub fn validate(resolver: &dyn IPatternResolver, memory: &BaseMemory) -> Vec<ValidationIssue> {
    resolver
        .alignment_issues(memory)
        .into_iter()
        .map(|description| ValidationIssue {
            dimension: ValidationDimension::Pattern,
            kind: ValidationIssue::PATTERN_MISALIGNED.to_string(),
            severity: IssueSeverity::Minor,
            description,
            citation_index: None,
        })
        .collect()
}
