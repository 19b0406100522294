//! SessionManager — concurrent per-session access via DashMap, optional
//! persistence through ISessionStorage.

use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;

use cortex_core::config::SessionConfig;
use cortex_core::errors::CortexResult;
use cortex_core::traits::ISessionStorage;
use cortex_core::CortexError;

use crate::context::SessionContext;

/// Thread-safe session manager.
pub struct SessionManager {
    sessions: Arc<DashMap<String, SessionContext>>,
    config: SessionConfig,
    persistence: Option<Arc<dyn ISessionStorage>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            config,
            persistence: None,
        }
    }

    /// Attach a persistence backend; open sessions are restored from it.
    pub fn with_persistence(
        config: SessionConfig,
        storage: Arc<dyn ISessionStorage>,
    ) -> CortexResult<Self> {
        let manager = Self {
            sessions: Arc::new(DashMap::new()),
            config,
            persistence: Some(storage),
        };
        if manager.config.persist_sessions {
            manager.restore_open_sessions()?;
        }
        Ok(manager)
    }

    fn restore_open_sessions(&self) -> CortexResult<()> {
        let Some(storage) = &self.persistence else {
            return Ok(());
        };
        for snapshot in storage.load_open_sessions()? {
            let ctx = SessionContext::from_snapshot(snapshot);
            self.sessions.insert(ctx.session_id.clone(), ctx);
        }
        Ok(())
    }

    /// Create a new session and return its ID.
    pub fn create_session(&self, metadata: Option<serde_json::Value>) -> CortexResult<String> {
        let mut ctx = SessionContext::new();
        ctx.metadata = metadata;
        let session_id = ctx.session_id.clone();
        self.persist(&ctx)?;
        self.sessions.insert(session_id.clone(), ctx);
        tracing::debug!(session_id = %session_id, "created session");
        Ok(session_id)
    }

    /// Get a session context by ID (cloned snapshot).
    pub fn get_session(&self, session_id: &str) -> Option<SessionContext> {
        self.sessions.get(session_id).map(|r| r.clone())
    }

    /// Mark memories as sent in a session. Fails `Conflict` once sealed.
    pub fn track_memories_sent(
        &self,
        session_id: &str,
        sent: &[(String, usize, u8)],
    ) -> CortexResult<()> {
        let mut entry = self.live_entry(session_id)?;
        for (memory_id, tokens, level) in sent {
            entry.mark_memory_sent(memory_id, *tokens, *level);
        }
        let snapshot_needed = self.config.persist_sessions;
        let ctx = entry.clone();
        drop(entry);
        if snapshot_needed {
            self.persist(&ctx)?;
        }
        Ok(())
    }

    /// Record a query against a session. Fails `Conflict` once sealed.
    pub fn record_query(&self, session_id: &str) -> CortexResult<()> {
        let mut entry = self.live_entry(session_id)?;
        entry.record_query();
        Ok(())
    }

    /// Record dedup accounting for one retrieval.
    pub fn record_dedup(
        &self,
        session_id: &str,
        requested: usize,
        filtered: usize,
        tokens_saved: usize,
    ) -> CortexResult<()> {
        let mut entry = self.live_entry(session_id)?;
        entry.record_dedup(requested, filtered, tokens_saved);
        Ok(())
    }

    /// Seal a session. Further mutations are rejected.
    pub fn end_session(&self, session_id: &str) -> CortexResult<SessionContext> {
        let mut entry =
            self.sessions
                .get_mut(session_id)
                .ok_or_else(|| CortexError::RetrievalError(
                    cortex_core::errors::RetrievalError::SessionNotFound {
                        session_id: session_id.to_string(),
                    },
                ))?;
        if entry.ended_at.is_none() {
            entry.ended_at = Some(chrono::Utc::now());
        }
        let ctx = entry.clone();
        drop(entry);
        self.persist(&ctx)?;
        Ok(ctx)
    }

    /// Seal idle sessions and drop ended sessions past retention.
    /// Returns (sealed, dropped).
    pub fn cleanup(&self) -> CortexResult<(usize, usize)> {
        let inactivity = Duration::minutes(self.config.inactivity_timeout_minutes as i64);
        let max_duration = Duration::hours(self.config.max_duration_hours as i64);
        let retention = Duration::days(self.config.retention_days as i64);
        let now = chrono::Utc::now();

        let mut sealed = 0;
        for mut entry in self.sessions.iter_mut() {
            if entry.ended_at.is_none()
                && (entry.idle_duration() > inactivity || entry.session_duration() > max_duration)
            {
                entry.ended_at = Some(now);
                sealed += 1;
            }
        }

        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|e| {
                e.ended_at.is_some() && now - e.last_activity > retention
            })
            .map(|e| e.session_id.clone())
            .collect();
        let mut dropped = 0;
        for session_id in expired {
            if self.sessions.remove(&session_id).is_some() {
                dropped += 1;
            }
        }

        if let Some(storage) = &self.persistence {
            // Persisted rows expire on the same retention clock.
            storage.delete_ended_before(now - retention)?;
        }

        tracing::debug!(sealed, dropped, "session cleanup");
        Ok((sealed, dropped))
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get all session IDs.
    pub fn session_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|r| r.key().clone()).collect()
    }

    fn live_entry(
        &self,
        session_id: &str,
    ) -> CortexResult<dashmap::mapref::one::RefMut<'_, String, SessionContext>> {
        let entry =
            self.sessions
                .get_mut(session_id)
                .ok_or_else(|| CortexError::RetrievalError(
                    cortex_core::errors::RetrievalError::SessionNotFound {
                        session_id: session_id.to_string(),
                    },
                ))?;
        if entry.is_ended() {
            return Err(CortexError::Conflict {
                reason: format!("session {session_id} has ended"),
            });
        }
        Ok(entry)
    }

    fn persist(&self, ctx: &SessionContext) -> CortexResult<()> {
        if !self.config.persist_sessions {
            return Ok(());
        }
        if let Some(storage) = &self.persistence {
            storage.save_session(&ctx.to_snapshot())?;
        }
        Ok(())
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
