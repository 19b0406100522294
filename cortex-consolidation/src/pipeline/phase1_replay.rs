//! Phase 1 — replay: select pending episodes old enough to have settled,
//! most-accessed first.

use chrono::Duration;

use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{
    BaseMemory, ConsolidationStatus, MemoryQuery, MemoryType, OrderBy, OrderDir,
};
use cortex_core::traits::IMemoryStorage;

pub fn select(
    storage: &dyn IMemoryStorage,
    config: &ConsolidationConfig,
) -> CortexResult<Vec<BaseMemory>> {
    let cutoff = chrono::Utc::now() - Duration::hours(config.min_age_hours as i64);
    storage.search(&MemoryQuery {
        types: Some(vec![MemoryType::Episodic]),
        consolidation_status: Some(ConsolidationStatus::Pending),
        max_date: Some(cutoff),
        order_by: OrderBy::AccessCount,
        order_dir: OrderDir::Desc,
        limit: Some(config.max_episodes),
        ..Default::default()
    })
}
