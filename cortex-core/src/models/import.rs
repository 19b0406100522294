//! Per-item outcomes for bulk imports.

use serde::{Deserialize, Serialize};

/// One failed item in a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportError {
    pub id: String,
    pub error: String,
}

/// Outcome of a bulk import. Duplicates are skipped, not failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}
