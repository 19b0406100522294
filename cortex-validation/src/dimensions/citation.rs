//! Citation validation: hash drift and missing files.

use std::path::Path;

use cortex_core::errors::{CortexError, ValidationError};
use cortex_core::memory::BaseMemory;
use cortex_core::models::{IssueSeverity, ValidationDimension, ValidationIssue};

use crate::citation_hash;

/// Validate every citation in a memory against the current source tree.
/// A missing file is fatal for that citation; drift is repairable.
pub fn validate(root: &Path, memory: &BaseMemory) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for (index, citation) in memory.linked_files.iter().enumerate() {
        match citation_hash::hash_region(root, citation) {
            Ok(current) => {
                if current != citation.hash {
                    issues.push(ValidationIssue {
                        dimension: ValidationDimension::Citation,
                        kind: ValidationIssue::CITATION_DRIFT.to_string(),
                        severity: IssueSeverity::Moderate,
                        description: format!(
                            "{}:{}-{} changed since cited",
                            citation.file_path, citation.line_start, citation.line_end
                        ),
                        citation_index: Some(index),
                    });
                }
            }
            Err(CortexError::ValidationError(ValidationError::FileUnreadable {
                path, ..
            })) => {
                issues.push(ValidationIssue {
                    dimension: ValidationDimension::Citation,
                    kind: ValidationIssue::CITATION_MISSING_FILE.to_string(),
                    severity: IssueSeverity::Major,
                    description: format!("cited file {path} is gone"),
                    citation_index: Some(index),
                });
            }
            Err(e) => {
                tracing::warn!(memory_id = %memory.id, error = %e, "citation check failed");
            }
        }
    }
    issues
}
