//! Compression levels and the level-keyed projection of a memory.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::memory::{Importance, MemoryType};

/// The four compression levels, L0 (id only) to L3 (full context).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompressionLevel {
    L0,
    L1,
    L2,
    L3,
}

impl CompressionLevel {
    /// All levels, highest fidelity first. Packing walks this order.
    pub const ALL_DESC: [CompressionLevel; 4] = [Self::L3, Self::L2, Self::L1, Self::L0];

    /// Target token count for this level.
    pub fn target_tokens(self) -> usize {
        match self {
            Self::L0 => 5,
            Self::L1 => 50,
            Self::L2 => 200,
            Self::L3 => 500,
        }
    }

    /// Hard token ceiling for this level.
    pub fn max_tokens(self) -> usize {
        match self {
            Self::L0 => 10,
            Self::L1 => 75,
            Self::L2 => 300,
            Self::L3 => 1000,
        }
    }

    /// One level down, saturating at L0.
    pub fn step_down(self) -> Self {
        match self {
            Self::L3 => Self::L2,
            Self::L2 => Self::L1,
            Self::L1 | Self::L0 => Self::L0,
        }
    }

    /// One level up, saturating at L3.
    pub fn step_up(self) -> Self {
        match self {
            Self::L0 => Self::L1,
            Self::L1 => Self::L2,
            Self::L2 | Self::L3 => Self::L3,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::L0 => 0,
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
        }
    }
}

/// Identity fields present at every level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L0Fields {
    pub id: String,
    pub memory_type: MemoryType,
    pub importance: Importance,
    pub tokens: usize,
}

/// L1 additions: the one-liner and a few tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L1Fields {
    pub one_liner: String,
    /// At most 3 tags.
    pub tags: Vec<String>,
    pub confidence: f64,
}

/// L2 additions: condensed knowledge with limited evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L2Details {
    pub knowledge: String,
    pub example: Option<String>,
    /// At most 2 evidence strings.
    pub evidence: Vec<String>,
}

/// L3 additions: the complete record context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct L3Full {
    pub complete_knowledge: String,
    pub all_examples: Vec<String>,
    pub all_evidence: Vec<String>,
    pub related_memories: Vec<String>,
    pub causal_chain: Vec<String>,
    pub linked_patterns: Vec<String>,
    pub linked_constraints: Vec<String>,
    pub linked_files: Vec<String>,
    pub linked_functions: Vec<String>,
}

/// A memory projected to one of the four levels.
/// Discriminated by `level` so consumers can switch on fidelity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "level")]
pub enum CompressedMemory {
    L0 {
        #[serde(flatten)]
        base: L0Fields,
    },
    L1 {
        #[serde(flatten)]
        base: L0Fields,
        #[serde(flatten)]
        brief: L1Fields,
    },
    L2 {
        #[serde(flatten)]
        base: L0Fields,
        #[serde(flatten)]
        brief: L1Fields,
        details: L2Details,
    },
    L3 {
        #[serde(flatten)]
        base: L0Fields,
        #[serde(flatten)]
        brief: L1Fields,
        details: L2Details,
        full: L3Full,
    },
}

impl CompressedMemory {
    pub fn level(&self) -> CompressionLevel {
        match self {
            Self::L0 { .. } => CompressionLevel::L0,
            Self::L1 { .. } => CompressionLevel::L1,
            Self::L2 { .. } => CompressionLevel::L2,
            Self::L3 { .. } => CompressionLevel::L3,
        }
    }

    pub fn memory_id(&self) -> &str {
        &self.base().id
    }

    pub fn token_count(&self) -> usize {
        self.base().tokens
    }

    fn base(&self) -> &L0Fields {
        match self {
            Self::L0 { base }
            | Self::L1 { base, .. }
            | Self::L2 { base, .. }
            | Self::L3 { base, .. } => base,
        }
    }
}

/// Output of a batch compression pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionResult {
    pub compressed: Vec<CompressedMemory>,
    pub total_tokens: usize,
    /// Mean of (compressed tokens / L3 tokens) across items.
    pub average_compression_ratio: f64,
    /// Number of items emitted per level.
    pub level_breakdown: BTreeMap<u8, usize>,
}
