//! The decay sweep: score every live memory, write back the ones that
//! changed, archive the ones that fell through the floor.

use std::sync::Arc;

use rayon::prelude::*;

use cortex_core::config::DecayConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{MemoryPatch, MemoryQuery};
use cortex_core::models::DecayReport;
use cortex_core::traits::IMemoryStorage;

use crate::formula;

/// Confidence changes smaller than this are not written back.
const MIN_DELTA: f64 = 1e-4;

pub struct DecayEngine {
    storage: Arc<dyn IMemoryStorage>,
    config: DecayConfig,
}

impl DecayEngine {
    pub fn new(storage: Arc<dyn IMemoryStorage>, config: DecayConfig) -> Self {
        Self { storage, config }
    }

    /// One decay pass over every live memory. Never increases confidence and
    /// never un-archives. Per-memory failures are logged and skipped.
    pub fn apply_decay(&self) -> CortexResult<DecayReport> {
        let now = chrono::Utc::now();
        let memories = self.storage.search(&MemoryQuery {
            limit: Some(cortex_core::constants::MAX_QUERY_LIMIT),
            ..Default::default()
        })?;

        // Score in parallel; writes stay on this thread behind the single
        // writer anyway.
        let scored: Vec<(String, f64, f64)> = memories
            .par_iter()
            .map(|m| {
                (
                    m.id.clone(),
                    m.confidence.value(),
                    formula::decayed_confidence(m, &self.config, now),
                )
            })
            .collect();

        let mut report = DecayReport {
            processed: scored.len(),
            ..Default::default()
        };

        for (id, old, new) in scored {
            if new < self.config.archival_threshold {
                if let Err(e) = self.archive_decayed(&id, new) {
                    tracing::warn!(memory_id = %id, error = %e, "archive during decay failed");
                    continue;
                }
                report.archived += 1;
                report.updated += 1;
            } else if old - new > MIN_DELTA {
                if let Err(e) = self.storage.update(&id, &MemoryPatch::confidence(new)) {
                    tracing::warn!(memory_id = %id, error = %e, "decay update failed");
                    continue;
                }
                report.updated += 1;
            }
        }

        tracing::info!(
            processed = report.processed,
            updated = report.updated,
            archived = report.archived,
            "decay pass complete"
        );
        Ok(report)
    }

    fn archive_decayed(&self, id: &str, confidence: f64) -> CortexResult<()> {
        self.storage
            .update(id, &MemoryPatch::confidence(confidence))?;
        self.storage.archive(id, "decayed")
    }
}
