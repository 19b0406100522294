use crate::memory::BaseMemory;

/// Resolved view of an external pattern id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternInfo {
    pub id: String,
    pub name: String,
    pub category: String,
}

/// Read-only lookup into the host's pattern/constraint/decision spaces.
/// The engine links by id only and dereferences through this.
pub trait IPatternResolver: Send + Sync {
    fn resolve_pattern(&self, id: &str) -> Option<PatternInfo>;

    /// Pattern-alignment problems for a memory, as issue descriptions.
    /// Default: the host has no alignment checks.
    fn alignment_issues(&self, _memory: &BaseMemory) -> Vec<String> {
        Vec::new()
    }
}

/// A resolver that knows nothing. Used when the host provides none.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl IPatternResolver for NullResolver {
    fn resolve_pattern(&self, _id: &str) -> Option<PatternInfo> {
        None
    }
}
