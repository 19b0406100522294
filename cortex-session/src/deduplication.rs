//! Session-aware deduplication.
//!
//! Filters already-sent memories out of retrieval results so a conversation
//! never pays for the same memory twice.

use crate::manager::SessionManager;

/// Result of deduplication filtering.
#[derive(Debug, Clone)]
pub struct DeduplicationResult {
    /// Memory IDs that should be sent (not yet seen in this session).
    pub to_send: Vec<String>,
    /// Memory IDs filtered out (already sent).
    pub filtered: Vec<String>,
    /// Estimated tokens saved by deduplication.
    pub tokens_saved: usize,
}

/// Annotate candidates with whether the session already received them.
pub fn annotate(
    manager: &SessionManager,
    session_id: &str,
    candidate_ids: &[String],
) -> Vec<(String, bool)> {
    let session = manager.get_session(session_id);
    candidate_ids
        .iter()
        .map(|id| {
            let already_sent = session
                .as_ref()
                .map(|s| s.is_memory_sent(id))
                .unwrap_or(false);
            (id.clone(), already_sent)
        })
        .collect()
}

/// Filter a candidate list, removing ids the session already received.
///
/// `token_estimates` maps memory_id → estimated token count of what would
/// have been re-sent.
pub fn filter_duplicates(
    manager: &SessionManager,
    session_id: &str,
    candidate_ids: &[String],
    token_estimates: &std::collections::HashMap<String, usize>,
) -> DeduplicationResult {
    let mut to_send = Vec::new();
    let mut filtered = Vec::new();
    let mut tokens_saved = 0;

    for (id, already_sent) in annotate(manager, session_id, candidate_ids) {
        if already_sent {
            tokens_saved += token_estimates.get(&id).copied().unwrap_or(0);
            filtered.push(id);
        } else {
            to_send.push(id);
        }
    }

    let result = DeduplicationResult {
        to_send,
        filtered,
        tokens_saved,
    };
    // The filtered list is still correct when the session is sealed or
    // gone; only the stats update is lost, so log and carry on.
    if let Err(e) = manager.record_dedup(
        session_id,
        candidate_ids.len(),
        result.filtered.len(),
        result.tokens_saved,
    ) {
        tracing::warn!(session_id = %session_id, error = %e, "dedup stats not recorded");
    }
    result
}
