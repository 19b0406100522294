//! Structured links from memories to external identifier spaces.
//!
//! Patterns, constraints, and functions are opaque ids resolved by the host;
//! file links carry citation state for drift validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Link to a code pattern by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PatternLink {
    pub pattern_id: String,
    pub pattern_name: Option<String>,
}

/// Link to a constraint by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ConstraintLink {
    pub constraint_id: String,
    pub constraint_name: Option<String>,
}

/// Link to a function by name and file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FunctionLink {
    pub function_name: String,
    pub file_path: String,
    pub signature: Option<String>,
}

/// A citation into source code. Also used as the file-link type.
///
/// `hash` is the first 16 hex chars of SHA-256 over the cited region plus a
/// small context window; a citation is valid iff the recomputed hash matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub snippet: Option<String>,
    pub hash: String,
    pub validated_at: Option<DateTime<Utc>>,
    pub valid: Option<bool>,
}

impl Citation {
    /// A citation without snippet or validation state.
    pub fn new(file_path: impl Into<String>, line_start: u32, line_end: u32, hash: String) -> Self {
        Self {
            file_path: file_path.into(),
            line_start,
            line_end,
            snippet: None,
            hash,
            validated_at: None,
            valid: None,
        }
    }

    /// Whether this citation's line range overlaps another's in the same file.
    pub fn overlaps(&self, other: &Citation) -> bool {
        self.file_path == other.file_path
            && self.line_start <= other.line_end
            && other.line_start <= self.line_end
    }
}
