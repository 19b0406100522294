//! Phase 4 — pruning: integrated episodes are archived as consolidated;
//! aged-out episodes nobody ever read are deleted outright.

use chrono::Duration;

use cortex_core::errors::CortexResult;
use cortex_core::memory::{
    half_life_days, ConsolidationStatus, MemoryPatch, MemoryQuery, MemoryType, TypedContent,
};
use cortex_core::traits::IMemoryStorage;

/// Returns the number of episodes archived or deleted.
pub fn prune(storage: &dyn IMemoryStorage, integrated_episodes: &[String]) -> CortexResult<usize> {
    let mut pruned = 0;

    // Integrated episodes: mark consolidated, archive.
    for episode_id in integrated_episodes {
        match mark_status(storage, episode_id, ConsolidationStatus::Consolidated) {
            Ok(true) => {
                storage.archive(episode_id, "consolidated")?;
                pruned += 1;
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(memory_id = %episode_id, error = %e, "consolidated mark failed");
            }
        }
    }

    // Dead episodes: past the episodic half-life, never accessed.
    let half_life = half_life_days(MemoryType::Episodic).unwrap_or(7.0);
    let cutoff = chrono::Utc::now() - Duration::days(half_life as i64);
    let dead = storage.search(&MemoryQuery {
        types: Some(vec![MemoryType::Episodic]),
        consolidation_status: Some(ConsolidationStatus::Pending),
        max_date: Some(cutoff),
        ..Default::default()
    })?;

    for episode in dead {
        if episode.access_count > 0 {
            continue;
        }
        if let Err(e) = mark_status(storage, &episode.id, ConsolidationStatus::Pruned) {
            tracing::warn!(memory_id = %episode.id, error = %e, "prune mark failed");
            continue;
        }
        storage.delete(&episode.id)?;
        pruned += 1;
    }

    Ok(pruned)
}

/// Rewrite an episode's consolidation status. Returns false when the memory
/// is gone or not episodic.
fn mark_status(
    storage: &dyn IMemoryStorage,
    episode_id: &str,
    status: ConsolidationStatus,
) -> CortexResult<bool> {
    let Some(memory) = storage.get(episode_id)? else {
        return Ok(false);
    };
    let TypedContent::Episodic(content) = &memory.content else {
        return Ok(false);
    };
    let mut updated = content.clone();
    updated.consolidation_status = status;
    storage.update(
        episode_id,
        &MemoryPatch {
            content: Some(TypedContent::Episodic(updated)),
            ..Default::default()
        },
    )?;
    Ok(true)
}
