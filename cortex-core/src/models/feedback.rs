//! Outcome feedback and decay reporting.

use serde::{Deserialize, Serialize};

/// What happened to generated output downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOutcome {
    Accepted,
    Modified,
    Rejected,
}

impl MemoryOutcome {
    /// Confidence delta applied to every influencing memory.
    pub fn confidence_delta(self) -> f64 {
        match self {
            Self::Accepted => 0.05,
            Self::Modified => -0.02,
            Self::Rejected => -0.10,
        }
    }
}

/// The memories that influenced one generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationContext {
    pub generation_id: String,
    /// Ids of the memories that shaped the output.
    pub influences: Vec<String>,
}

/// Running aggregate over processed outcomes. In-memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub total_outcomes: u64,
    pub accepted: u64,
    pub modified: u64,
    pub rejected: u64,
    pub total_adjustment: f64,
}

impl FeedbackStats {
    pub fn record(&mut self, outcome: MemoryOutcome, adjustment: f64, influence_count: usize) {
        self.total_outcomes += 1;
        match outcome {
            MemoryOutcome::Accepted => self.accepted += 1,
            MemoryOutcome::Modified => self.modified += 1,
            MemoryOutcome::Rejected => self.rejected += 1,
        }
        self.total_adjustment += adjustment * influence_count as f64;
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.total_outcomes == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.total_outcomes as f64
    }

    pub fn average_adjustment(&self) -> f64 {
        if self.total_outcomes == 0 {
            return 0.0;
        }
        self.total_adjustment / self.total_outcomes as f64
    }
}

/// Result of one decay sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DecayReport {
    pub processed: usize,
    pub updated: usize,
    pub archived: usize,
}
