//! Per-session statistics derived from the context.

use cortex_core::models::SessionStats;

use crate::context::SessionContext;

/// Compute the stats aggregate for a session.
pub fn session_stats(ctx: &SessionContext) -> SessionStats {
    let dedup_efficiency = if ctx.memories_requested == 0 {
        0.0
    } else {
        ctx.duplicates_filtered as f64 / ctx.memories_requested as f64
    };
    let avg_tokens_per_query = if ctx.queries_made == 0 {
        0.0
    } else {
        ctx.tokens_sent as f64 / ctx.queries_made as f64
    };

    SessionStats {
        session_id: ctx.session_id.clone(),
        unique_memories_loaded: ctx.loaded_memories.len(),
        dedup_efficiency,
        tokens_sent: ctx.tokens_sent,
        tokens_saved: ctx.tokens_saved,
        queries_made: ctx.queries_made,
        avg_tokens_per_query,
        level_distribution: ctx.level_counts.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_handle_zero_division() {
        let ctx = SessionContext::new();
        let stats = session_stats(&ctx);
        assert_eq!(stats.dedup_efficiency, 0.0);
        assert_eq!(stats.avg_tokens_per_query, 0.0);
    }

    #[test]
    fn stats_reflect_activity() {
        let mut ctx = SessionContext::new();
        ctx.mark_memory_sent("mem_a", 100, 1);
        ctx.mark_memory_sent("mem_b", 200, 2);
        ctx.record_query();
        ctx.record_query();
        ctx.record_dedup(4, 2, 150);

        let stats = session_stats(&ctx);
        assert_eq!(stats.unique_memories_loaded, 2);
        assert_eq!(stats.tokens_sent, 300);
        assert_eq!(stats.tokens_saved, 150);
        assert!((stats.dedup_efficiency - 0.5).abs() < f64::EPSILON);
        assert!((stats.avg_tokens_per_query - 150.0).abs() < f64::EPSILON);
        assert_eq!(stats.level_distribution.get(&1), Some(&1));
    }
}
