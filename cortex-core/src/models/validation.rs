//! Validation issues, reports, and healing outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The dimension a validator runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationDimension {
    Citation,
    Temporal,
    Contradiction,
    Pattern,
}

impl ValidationDimension {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Citation => "citation",
            Self::Temporal => "temporal",
            Self::Contradiction => "contradiction",
            Self::Pattern => "pattern",
        }
    }
}

/// Severity of a single issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Minor,
    Moderate,
    Major,
}

/// One finding from a validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub dimension: ValidationDimension,
    /// Stable machine-readable kind, e.g. `citation.drift`, `temporal.stale`.
    pub kind: String,
    pub severity: IssueSeverity,
    pub description: String,
    /// Index into `linked_files` for citation issues.
    pub citation_index: Option<usize>,
}

impl ValidationIssue {
    pub const CITATION_DRIFT: &'static str = "citation.drift";
    pub const CITATION_MISSING_FILE: &'static str = "citation.missing_file";
    pub const TEMPORAL_STALE: &'static str = "temporal.stale";
    pub const TEMPORAL_DORMANT: &'static str = "temporal.dormant";
    pub const CONTRADICTION_ACTIVE: &'static str = "contradiction.active";
    pub const PATTERN_MISALIGNED: &'static str = "pattern.misaligned";
}

/// The full validation report for one memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub memory_id: String,
    pub validated_at: DateTime<Utc>,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// A report is healthy when no validator found anything.
    pub fn is_healthy(&self) -> bool {
        self.issues.is_empty()
    }
}

/// A repair the healing engine performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum HealingAction {
    /// The citation hash was recomputed against current source.
    CitationRehashed { citation_index: usize },
    /// `last_validated` refreshed and confidence nudged up.
    TemporalRefreshed,
}

/// Outcome of a healing pass over one memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingOutcome {
    pub memory_id: String,
    pub actions: Vec<HealingAction>,
    pub healed_at: DateTime<Utc>,
    /// Issue kinds that healing cannot repair (contradiction, pattern).
    pub skipped: Vec<String>,
}
