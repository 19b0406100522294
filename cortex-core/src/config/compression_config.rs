use serde::{Deserialize, Serialize};

use crate::models::CompressionLevel;

/// Compression selection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// Level tried first.
    pub target_level: CompressionLevel,
    /// Floor — items never compress below this.
    pub min_level: CompressionLevel,
    /// Ceiling — items never escalate above this.
    pub max_level: CompressionLevel,
    /// Step up one level when the item fits there within budget.
    pub allow_escalation: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            target_level: CompressionLevel::L2,
            min_level: CompressionLevel::L0,
            max_level: CompressionLevel::L3,
            allow_escalation: false,
        }
    }
}
