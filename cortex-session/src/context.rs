//! SessionContext — loaded sets and token tracking per conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use cortex_core::identity;
use cortex_core::models::SessionSnapshot;

/// Per-session state tracking loaded memories, patterns, files, constraints,
/// and token usage. Loaded sets are add-only until the session ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Unique session identifier.
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    /// Set when the session is sealed; sealed sessions reject mutation.
    pub ended_at: Option<DateTime<Utc>>,
    pub last_activity: DateTime<Utc>,
    /// Memory IDs already sent in this session.
    pub loaded_memories: HashSet<String>,
    /// Pattern IDs already sent.
    pub loaded_patterns: HashSet<String>,
    /// File paths already sent.
    pub loaded_files: HashSet<String>,
    /// Constraint IDs already sent.
    pub loaded_constraints: HashSet<String>,
    /// Total tokens sent in this session.
    pub tokens_sent: usize,
    /// Tokens saved by deduplication.
    pub tokens_saved: usize,
    /// Total queries made in this session.
    pub queries_made: u64,
    /// Memories requested across all queries, duplicates included.
    pub memories_requested: u64,
    /// Requested memories that were filtered as already sent.
    pub duplicates_filtered: u64,
    /// Memories sent per compression level.
    pub level_counts: BTreeMap<u8, usize>,
    pub metadata: Option<serde_json::Value>,
}

impl SessionContext {
    /// Create a new session context with a generated id.
    pub fn new() -> Self {
        Self::with_id(identity::new_session_id())
    }

    /// Create a new session context with a caller-chosen id.
    pub fn with_id(session_id: String) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            started_at: now,
            ended_at: None,
            last_activity: now,
            loaded_memories: HashSet::new(),
            loaded_patterns: HashSet::new(),
            loaded_files: HashSet::new(),
            loaded_constraints: HashSet::new(),
            tokens_sent: 0,
            tokens_saved: 0,
            queries_made: 0,
            memories_requested: 0,
            duplicates_filtered: 0,
            level_counts: BTreeMap::new(),
            metadata: None,
        }
    }

    /// Whether the session has been sealed.
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }

    /// Mark a memory as sent with its token cost and compression level.
    pub fn mark_memory_sent(&mut self, memory_id: &str, tokens: usize, level: u8) {
        self.loaded_memories.insert(memory_id.to_string());
        self.tokens_sent += tokens;
        *self.level_counts.entry(level).or_insert(0) += 1;
        self.last_activity = Utc::now();
    }

    /// Check if a memory has already been sent.
    pub fn is_memory_sent(&self, memory_id: &str) -> bool {
        self.loaded_memories.contains(memory_id)
    }

    /// Record a query.
    pub fn record_query(&mut self) {
        self.queries_made += 1;
        self.last_activity = Utc::now();
    }

    /// Record dedup accounting for one retrieval.
    pub fn record_dedup(&mut self, requested: usize, filtered: usize, tokens_saved: usize) {
        self.memories_requested += requested as u64;
        self.duplicates_filtered += filtered as u64;
        self.tokens_saved += tokens_saved;
    }

    /// Duration since last activity.
    pub fn idle_duration(&self) -> chrono::Duration {
        Utc::now() - self.last_activity
    }

    /// Duration since session creation.
    pub fn session_duration(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }

    /// Flatten to the persistable form.
    pub fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.session_id.clone(),
            started_at: self.started_at,
            ended_at: self.ended_at,
            last_activity: self.last_activity,
            tokens_sent: self.tokens_sent,
            queries_made: self.queries_made,
            loaded_memories: self.loaded_memories.iter().cloned().collect(),
            loaded_patterns: self.loaded_patterns.iter().cloned().collect(),
            loaded_files: self.loaded_files.iter().cloned().collect(),
            loaded_constraints: self.loaded_constraints.iter().cloned().collect(),
            metadata: self.metadata.clone(),
        }
    }

    /// Rebuild from the persistable form.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.id,
            started_at: snapshot.started_at,
            ended_at: snapshot.ended_at,
            last_activity: snapshot.last_activity,
            loaded_memories: snapshot.loaded_memories.into_iter().collect(),
            loaded_patterns: snapshot.loaded_patterns.into_iter().collect(),
            loaded_files: snapshot.loaded_files.into_iter().collect(),
            loaded_constraints: snapshot.loaded_constraints.into_iter().collect(),
            tokens_sent: snapshot.tokens_sent,
            tokens_saved: 0,
            queries_made: snapshot.queries_made,
            memories_requested: 0,
            duplicates_filtered: 0,
            level_counts: BTreeMap::new(),
            metadata: snapshot.metadata,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
