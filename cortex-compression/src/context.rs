//! Graph context for full-fidelity projections.
//!
//! L3 carries the memory's neighborhood — which memories relate to it and
//! what hangs off it causally. That data lives in the relationship and edge
//! tables, not on the record, so the packer asks a source for it.

use cortex_core::memory::BaseMemory;

/// A memory's neighborhood, as ids.
#[derive(Debug, Clone, Default)]
pub struct MemoryNeighborhood {
    /// Memories tied to this one through the relationship table or the
    /// supersession chain.
    pub related_memories: Vec<String>,
    /// Downstream causal chain, nearest first.
    pub causal_chain: Vec<String>,
}

/// Supplies neighborhood data for L3 projections.
pub trait INeighborhoodSource: Send + Sync {
    fn neighborhood(&self, memory: &BaseMemory) -> MemoryNeighborhood;
}

/// A source with no graph behind it. L3 projections come out without
/// neighborhood context; use only where the graph genuinely doesn't exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyNeighborhood;

impl INeighborhoodSource for EmptyNeighborhood {
    fn neighborhood(&self, _memory: &BaseMemory) -> MemoryNeighborhood {
        MemoryNeighborhood::default()
    }
}
