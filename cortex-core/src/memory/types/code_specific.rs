use serde::{Deserialize, Serialize};

use crate::memory::links::Citation;

/// Why a code pattern exists. Half-life: 180d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PatternRationaleContent {
    pub pattern_id: String,
    pub rationale: String,
    #[serde(default)]
    pub alternatives_rejected: Vec<String>,
    #[serde(default)]
    pub tradeoffs: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// A sanctioned violation of a constraint. Half-life: 90d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConstraintOverrideContent {
    pub constraint_id: String,
    pub justification: String,
    #[serde(default)]
    pub scope: Vec<String>,
    pub expires_note: Option<String>,
}

/// Context around an architectural decision. Half-life: 180d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DecisionContextContent {
    pub decision: String,
    pub reasoning: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// A known smell with its remediation. Half-life: 90d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CodeSmellContent {
    pub smell: String,
    pub location: String,
    pub remediation: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}
