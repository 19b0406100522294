//! Search options accepted by the retrieval engine.

use cortex_core::memory::{Importance, MemoryType};

/// Options for one search call.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub limit: usize,
    pub types: Option<Vec<MemoryType>>,
    pub min_confidence: Option<f64>,
    pub importance: Option<Vec<Importance>>,
    pub include_archived: bool,
    /// Session to annotate and account against.
    pub session_id: Option<String>,
    /// Remove candidates the session already received.
    pub exclude_already_sent: bool,
    /// Add returned candidates to the session's loaded set.
    pub track_in_session: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            types: None,
            min_confidence: None,
            importance: None,
            include_archived: false,
            session_id: None,
            exclude_already_sent: false,
            track_in_session: false,
        }
    }
}

impl SearchOptions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    pub fn in_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }
}
