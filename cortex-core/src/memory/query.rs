//! `MemoryQuery` — the filter configuration accepted by store searches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_QUERY_LIMIT, MAX_QUERY_LIMIT};

use super::importance::Importance;
use super::types::{ConsolidationStatus, MemoryType};

/// Sort key for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    #[default]
    CreatedAt,
    UpdatedAt,
    Confidence,
    AccessCount,
    LastAccessed,
}

impl OrderBy {
    /// Column name in the memories table.
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Confidence => "confidence",
            Self::AccessCount => "access_count",
            Self::LastAccessed => "last_accessed",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderDir {
    Asc,
    #[default]
    Desc,
}

impl OrderDir {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filter configuration for store searches. All fields are optional;
/// an empty query matches every non-archived memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryQuery {
    pub types: Option<Vec<MemoryType>>,
    /// Topic substrings matched against the summary.
    pub topics: Option<Vec<String>>,
    pub patterns: Option<Vec<String>>,
    pub constraints: Option<Vec<String>>,
    pub decisions: Option<Vec<String>>,
    pub files: Option<Vec<String>>,
    pub functions: Option<Vec<String>>,
    pub min_confidence: Option<f64>,
    pub max_confidence: Option<f64>,
    pub min_access_count: Option<u64>,
    pub importance: Option<Vec<Importance>>,
    /// Archived memories are excluded unless this is set.
    pub include_archived: bool,
    pub tags: Option<Vec<String>>,
    pub min_date: Option<DateTime<Utc>>,
    pub max_date: Option<DateTime<Utc>>,
    pub consolidation_status: Option<ConsolidationStatus>,
    pub order_by: OrderBy,
    pub order_dir: OrderDir,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl MemoryQuery {
    /// Effective limit: default 100, hard-capped at 10 000.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUERY_LIMIT).min(MAX_QUERY_LIMIT)
    }

    /// Effective offset, defaulting to 0.
    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// Query matching a single type.
    pub fn of_type(memory_type: MemoryType) -> Self {
        Self {
            types: Some(vec![memory_type]),
            ..Self::default()
        }
    }

    /// Query matching memories linked to a file.
    pub fn of_file(path: impl Into<String>) -> Self {
        Self {
            files: Some(vec![path.into()]),
            ..Self::default()
        }
    }

    /// Query matching memories linked to a pattern.
    pub fn of_pattern(pattern_id: impl Into<String>) -> Self {
        Self {
            patterns: Some(vec![pattern_id.into()]),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_capped() {
        let q = MemoryQuery {
            limit: Some(1_000_000),
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), MAX_QUERY_LIMIT);
    }

    #[test]
    fn default_limit_is_100() {
        assert_eq!(MemoryQuery::default().effective_limit(), 100);
    }
}
