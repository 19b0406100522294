//! # cortex
//!
//! The engine handle. Hosts construct a `Cortex` with `initialize`, call
//! operations on the shared handle from any task, and `shutdown` when done.
//! No hidden singletons: everything the engine owns hangs off this struct.

mod handle;

pub use handle::{Cortex, CortexBuilder};

// The operation surface re-exports what callers need to talk to it.
pub use cortex_compression::CompressOptions;
pub use cortex_core::config::CortexConfig;
pub use cortex_core::errors::{CortexError, CortexResult};
pub use cortex_core::memory::{
    BaseMemory, Citation, Confidence, Importance, MemoryPatch, MemoryQuery, MemoryType,
    TypedContent,
};
pub use cortex_core::models::{
    CausalChain, CausalEdge, CausalRelation, CompressedMemory, CompressionLevel,
    CompressionResult, ConsolidationReport, DecayReport, GenerationContext, MemoryOutcome,
    RetrievalResponse, SessionStats, ValidationReport,
};
pub use cortex_core::traits::{
    IEmbeddingProvider, IPatternResolver, ITokenEstimator, PatternInfo,
};
pub use cortex_causal::{EdgeRequest, TraversalOptions};
pub use cortex_retrieval::SearchOptions;
