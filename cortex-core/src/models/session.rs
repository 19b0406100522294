//! Persistable session state and the stats derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of thing a session loaded-set entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadedKind {
    Memory,
    Pattern,
    File,
    Constraint,
}

impl LoadedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Pattern => "pattern",
            Self::File => "file",
            Self::Constraint => "constraint",
        }
    }
}

impl std::str::FromStr for LoadedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "pattern" => Ok(Self::Pattern),
            "file" => Ok(Self::File),
            "constraint" => Ok(Self::Constraint),
            other => Err(format!("unknown loaded kind: {other}")),
        }
    }
}

/// A session row as persisted, loaded sets flattened to id lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub last_activity: DateTime<Utc>,
    pub tokens_sent: usize,
    pub queries_made: u64,
    pub loaded_memories: Vec<String>,
    pub loaded_patterns: Vec<String>,
    pub loaded_files: Vec<String>,
    pub loaded_constraints: Vec<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Aggregate statistics for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,
    pub unique_memories_loaded: usize,
    /// Fraction of requested-but-not-resent memories over all requested.
    pub dedup_efficiency: f64,
    pub tokens_sent: usize,
    pub tokens_saved: usize,
    pub queries_made: u64,
    pub avg_tokens_per_query: f64,
    /// Memories sent per compression level.
    pub level_distribution: BTreeMap<u8, usize>,
}
