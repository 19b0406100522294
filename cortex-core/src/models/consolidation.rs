//! Consolidation run reporting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A failure recorded against one phase; later phases still run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseFailure {
    pub phase: String,
    pub error: String,
}

/// Whole-run metrics returned by the consolidation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Episodes selected by the replay phase.
    pub processed: usize,
    /// Candidate facts surviving abstraction.
    pub abstracted: usize,
    /// Semantic memories created or merged by integration.
    pub integrated: usize,
    /// Episodes archived or hard-deleted by pruning.
    pub pruned: usize,
    /// Memories boosted by strengthening.
    pub strengthened: usize,
    pub failures: Vec<PhaseFailure>,
}
