use serde::{Deserialize, Serialize};

use super::defaults;

/// Session subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Hard cap on session lifetime (hours).
    pub max_duration_hours: u64,
    /// Idle time after which cleanup seals a session (minutes).
    pub inactivity_timeout_minutes: u64,
    /// Token ceiling per session.
    pub max_tokens_per_session: usize,
    /// Persist sessions to storage so they survive restarts.
    pub persist_sessions: bool,
    /// Days an ended session is retained before cleanup drops it.
    pub retention_days: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_duration_hours: defaults::DEFAULT_MAX_DURATION_HOURS,
            inactivity_timeout_minutes: defaults::DEFAULT_INACTIVITY_TIMEOUT_MINUTES,
            max_tokens_per_session: defaults::DEFAULT_MAX_TOKENS_PER_SESSION,
            persist_sessions: true,
            retention_days: defaults::DEFAULT_RETENTION_DAYS,
        }
    }
}
