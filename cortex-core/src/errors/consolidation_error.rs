/// Consolidation pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    #[error("consolidation already in progress")]
    AlreadyRunning,

    #[error("phase {phase} failed: {reason}")]
    PhaseFailed { phase: String, reason: String },

    #[error("merge failed: {reason}")]
    MergeFailed { reason: String },
}
