use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Core project/workspace metadata. Half-life: ∞
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CoreContent {
    pub project_name: String,
    pub description: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Institutional knowledge. Half-life: 365d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TribalContent {
    pub knowledge: String,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub consequences: Vec<String>,
}

/// How-to procedures. Half-life: 180d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProceduralContent {
    pub steps: Vec<ProceduralStep>,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub checklist: Vec<String>,
    #[serde(default)]
    pub corrections: Vec<String>,
    #[serde(default)]
    pub usage_count: u64,
    #[serde(default)]
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProceduralStep {
    pub order: u32,
    pub instruction: String,
}

/// Consolidated knowledge abstracted from episodes. Half-life: 90d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SemanticContent {
    pub topic: String,
    pub knowledge: String,
    /// Episode ids this knowledge was abstracted from.
    #[serde(default)]
    pub consolidated_from: Vec<String>,
    /// Number of episodes supporting this knowledge.
    #[serde(default)]
    pub supporting_evidence: u32,
}

/// Raw interaction records, the input to consolidation. Half-life: 7d
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EpisodicContent {
    pub interaction: String,
    #[serde(default)]
    pub context: EpisodeContext,
    #[serde(default)]
    pub extracted_facts: Vec<ExtractedFact>,
    #[serde(default)]
    pub consolidation_status: ConsolidationStatus,
    pub session_id: Option<String>,
}

/// Where an episode happened. `focus` groups episodes for abstraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeContext {
    pub focus: String,
    pub files_touched: Vec<String>,
}

impl Default for EpisodeContext {
    fn default() -> Self {
        Self {
            focus: "general".to_string(),
            files_touched: Vec::new(),
        }
    }
}

/// A discrete fact harvested from an episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedFact {
    pub fact: String,
    pub confidence: f64,
    pub extracted_at: Option<DateTime<Utc>>,
}

/// Lifecycle of an episodic memory through consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationStatus {
    #[default]
    Pending,
    Consolidated,
    Pruned,
}

impl ConsolidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Consolidated => "consolidated",
            Self::Pruned => "pruned",
        }
    }
}
