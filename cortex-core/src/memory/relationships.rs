use serde::{Deserialize, Serialize};

/// Lightweight (non-causal) relationship types between memories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Supersedes,
    Supports,
    Contradicts,
    Related,
    DerivedFrom,
}

impl RelationshipType {
    /// All variants for iteration.
    pub const ALL: [RelationshipType; 5] = [
        Self::Supersedes,
        Self::Supports,
        Self::Contradicts,
        Self::Related,
        Self::DerivedFrom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Supersedes => "supersedes",
            Self::Supports => "supports",
            Self::Contradicts => "contradicts",
            Self::Related => "related",
            Self::DerivedFrom => "derived_from",
        }
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supersedes" => Ok(Self::Supersedes),
            "supports" => Ok(Self::Supports),
            "contradicts" => Ok(Self::Contradicts),
            "related" => Ok(Self::Related),
            "derived_from" => Ok(Self::DerivedFrom),
            other => Err(format!("unknown relationship type: {other}")),
        }
    }
}

/// An edge in the relationship graph between two memories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub source_id: String,
    pub target_id: String,
    pub relationship_type: RelationshipType,
}
