pub mod causal;
pub mod compressed_memory;
pub mod consolidation;
pub mod feedback;
pub mod import;
pub mod memory_summary;
pub mod session;
pub mod validation;

pub use causal::{
    CausalChain, CausalEdge, CausalEvidence, CausalRelation, ChainNode, EvidenceType,
};
pub use compressed_memory::{
    CompressedMemory, CompressionLevel, CompressionResult, L0Fields, L1Fields, L2Details, L3Full,
};
pub use consolidation::{ConsolidationReport, PhaseFailure};
pub use feedback::{DecayReport, FeedbackStats, GenerationContext, MemoryOutcome};
pub use import::{BulkImportReport, ImportError};
pub use memory_summary::{MemorySummary, RetrievalResponse, RetrievedMemory};
pub use session::{LoadedKind, SessionSnapshot, SessionStats};
pub use validation::{
    HealingAction, HealingOutcome, IssueSeverity, ValidationDimension, ValidationIssue,
    ValidationReport,
};
