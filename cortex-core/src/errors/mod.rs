//! Error taxonomy for the whole engine.
//!
//! Subsystem crates define their failures in the sub-enums here; everything
//! surfaces at the boundary as a `CortexError`.

mod causal_error;
mod consolidation_error;
mod retrieval_error;
mod storage_error;
mod validation_error;

pub use causal_error::CausalError;
pub use consolidation_error::ConsolidationError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;
pub use validation_error::ValidationError;

/// Result alias used across the workspace.
pub type CortexResult<T> = Result<T, CortexError>;

/// Top-level error for all Cortex operations.
#[derive(Debug, thiserror::Error)]
pub enum CortexError {
    #[error("memory not found: {id}")]
    MemoryNotFound { id: String },

    #[error("invalid memory: {reason}")]
    InvalidMemory { reason: String },

    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("memory {id} is archived; restore it before {operation}")]
    MemoryArchived { id: String, operation: String },

    #[error("conflict: {reason}")]
    Conflict { reason: String },

    #[error("cancelled during {operation}")]
    Cancelled { operation: String },

    #[error("embedding provider '{name}' unavailable")]
    ProviderUnavailable { name: String },

    #[error("integrity violation: {reason}")]
    IntegrityViolation { reason: String },

    #[error("token budget exceeded: needed {needed}, remaining {remaining}")]
    BudgetExceeded { needed: usize, remaining: usize },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("causal error: {0}")]
    CausalError(#[from] CausalError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("validation error: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("consolidation error: {0}")]
    ConsolidationError(#[from] ConsolidationError),
}

impl CortexError {
    /// Whether a retry could plausibly succeed (transient storage contention).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CortexError::StorageError(StorageError::Busy { .. })
        )
    }
}
