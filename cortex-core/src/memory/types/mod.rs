//! Per-type content payloads and the `MemoryType` discriminant.

mod code_specific;
mod domain_agnostic;

pub use code_specific::{
    CodeSmellContent, ConstraintOverrideContent, DecisionContextContent, PatternRationaleContent,
};
pub use domain_agnostic::{
    ConsolidationStatus, CoreContent, EpisodeContext, EpisodicContent, ExtractedFact,
    ProceduralContent, ProceduralStep, SemanticContent, TribalContent,
};

use serde::{Deserialize, Serialize};

/// The nine memory types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Core,
    Tribal,
    Procedural,
    Semantic,
    Episodic,
    PatternRationale,
    ConstraintOverride,
    DecisionContext,
    CodeSmell,
}

impl MemoryType {
    /// All variants for iteration.
    pub const ALL: [MemoryType; 9] = [
        Self::Core,
        Self::Tribal,
        Self::Procedural,
        Self::Semantic,
        Self::Episodic,
        Self::PatternRationale,
        Self::ConstraintOverride,
        Self::DecisionContext,
        Self::CodeSmell,
    ];

    /// Stable string form matching the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Tribal => "tribal",
            Self::Procedural => "procedural",
            Self::Semantic => "semantic",
            Self::Episodic => "episodic",
            Self::PatternRationale => "pattern_rationale",
            Self::ConstraintOverride => "constraint_override",
            Self::DecisionContext => "decision_context",
            Self::CodeSmell => "code_smell",
        }
    }
}

impl std::str::FromStr for MemoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Self::Core),
            "tribal" => Ok(Self::Tribal),
            "procedural" => Ok(Self::Procedural),
            "semantic" => Ok(Self::Semantic),
            "episodic" => Ok(Self::Episodic),
            "pattern_rationale" => Ok(Self::PatternRationale),
            "constraint_override" => Ok(Self::ConstraintOverride),
            "decision_context" => Ok(Self::DecisionContext),
            "code_smell" => Ok(Self::CodeSmell),
            other => Err(format!("unknown memory type: {other}")),
        }
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
