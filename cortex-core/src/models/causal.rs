//! Causal graph types: edges, evidence, and traversal chains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The 8 causal relation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalRelation {
    Caused,
    Enabled,
    Prevented,
    Contradicts,
    Supersedes,
    Supports,
    DerivedFrom,
    TriggeredBy,
}

impl CausalRelation {
    /// All variants for iteration.
    pub const ALL: [CausalRelation; 8] = [
        Self::Caused,
        Self::Enabled,
        Self::Prevented,
        Self::Contradicts,
        Self::Supersedes,
        Self::Supports,
        Self::DerivedFrom,
        Self::TriggeredBy,
    ];

    /// Relations followed by counterfactual traversal ("what depends on this").
    pub const COUNTERFACTUAL: [CausalRelation; 5] = [
        Self::Supports,
        Self::Enabled,
        Self::Caused,
        Self::TriggeredBy,
        Self::DerivedFrom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caused => "caused",
            Self::Enabled => "enabled",
            Self::Prevented => "prevented",
            Self::Contradicts => "contradicts",
            Self::Supersedes => "supersedes",
            Self::Supports => "supports",
            Self::DerivedFrom => "derived_from",
            Self::TriggeredBy => "triggered_by",
        }
    }
}

impl std::str::FromStr for CausalRelation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "caused" => Ok(Self::Caused),
            "enabled" => Ok(Self::Enabled),
            "prevented" => Ok(Self::Prevented),
            "contradicts" => Ok(Self::Contradicts),
            "supersedes" => Ok(Self::Supersedes),
            "supports" => Ok(Self::Supports),
            "derived_from" => Ok(Self::DerivedFrom),
            "triggered_by" => Ok(Self::TriggeredBy),
            other => Err(format!("unknown causal relation: {other}")),
        }
    }
}

impl std::fmt::Display for CausalRelation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a piece of causal evidence was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceType {
    Temporal,
    Semantic,
    Entity,
    Explicit,
    UserConfirmed,
}

/// One piece of evidence supporting a causal edge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CausalEvidence {
    pub evidence_type: EvidenceType,
    pub description: String,
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
}

/// A directed causal edge between two memories.
///
/// Unique on `(source_id, target_id, relation)`; re-creating an existing
/// edge merges evidence and keeps the max strength.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalEdge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub relation: CausalRelation,
    /// Strength in [0.0, 1.0].
    pub strength: f64,
    pub evidence: Vec<CausalEvidence>,
    pub created_at: DateTime<Utc>,
    pub validated_at: Option<DateTime<Utc>>,
    /// True when produced by an inference strategy rather than a caller.
    pub inferred: bool,
    pub created_by: Option<String>,
    /// Set when an endpoint memory was deleted; the edge stays for history.
    pub tombstone: bool,
}

/// One node reached during causal traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainNode {
    pub memory_id: String,
    pub depth: usize,
    /// Product of edge strengths along the strongest path from the root.
    pub path_strength: f64,
}

/// The bounded subgraph produced by a causal traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalChain {
    pub root_id: String,
    pub nodes: Vec<ChainNode>,
    pub edges: Vec<CausalEdge>,
    pub max_depth: usize,
    pub total_memories: usize,
    /// Max over branches of the path-strength product.
    pub chain_confidence: f64,
}
