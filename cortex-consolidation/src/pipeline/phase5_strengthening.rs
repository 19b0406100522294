//! Phase 5 — strengthening: memories that keep getting used earn
//! confidence, capped at +0.1 per run.

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{MemoryPatch, MemoryQuery, OrderBy, OrderDir};
use cortex_core::traits::IMemoryStorage;

pub fn strengthen(
    storage: &dyn IMemoryStorage,
    config: &ConsolidationConfig,
) -> CortexResult<usize> {
    let frequent = storage.search(&MemoryQuery {
        min_access_count: Some(config.strengthen_min_access),
        order_by: OrderBy::AccessCount,
        order_dir: OrderDir::Desc,
        limit: Some(config.strengthen_top_n),
        ..Default::default()
    })?;

    let mut strengthened = 0;
    for memory in frequent {
        let boost = (memory.access_count as f64 * 0.01).min(0.1);
        let new_confidence = (memory.confidence.value() + boost).min(1.0);
        if new_confidence <= memory.confidence.value() {
            continue;
        }
        match storage.update(&memory.id, &MemoryPatch::confidence(new_confidence)) {
            Ok(_) => strengthened += 1,
            Err(e) => {
                tracing::warn!(memory_id = %memory.id, error = %e, "strengthen failed");
            }
        }
    }
    Ok(strengthened)
}
