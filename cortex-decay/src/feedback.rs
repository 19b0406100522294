//! Outcome feedback: accepted output strengthens its influences, rejected
//! output weakens them.

use std::sync::{Arc, Mutex};

use cortex_core::errors::CortexResult;
use cortex_core::memory::MemoryPatch;
use cortex_core::models::{FeedbackStats, GenerationContext, MemoryOutcome};
use cortex_core::traits::IMemoryStorage;

pub struct FeedbackProcessor {
    storage: Arc<dyn IMemoryStorage>,
    stats: Mutex<FeedbackStats>,
}

impl FeedbackProcessor {
    pub fn new(storage: Arc<dyn IMemoryStorage>) -> Self {
        Self {
            storage,
            stats: Mutex::new(FeedbackStats::default()),
        }
    }

    /// Adjust every influencing memory's confidence by the outcome delta and
    /// count the use as an access. Missing influences are logged and skipped.
    /// Returns how many memories were adjusted.
    pub fn process_outcome(
        &self,
        generation: &GenerationContext,
        outcome: MemoryOutcome,
        feedback: Option<&str>,
    ) -> CortexResult<usize> {
        let delta = outcome.confidence_delta();
        let mut adjusted = 0;

        for memory_id in &generation.influences {
            let Some(memory) = self.storage.get(memory_id)? else {
                tracing::warn!(memory_id = %memory_id, "feedback influence not found");
                continue;
            };
            if memory.archived {
                continue;
            }
            let new_confidence = memory.confidence.adjusted(delta).value();
            if let Err(e) = self
                .storage
                .update(memory_id, &MemoryPatch::confidence(new_confidence))
            {
                tracing::warn!(memory_id = %memory_id, error = %e, "feedback update failed");
                continue;
            }
            self.storage.record_access(&[memory_id.clone()])?;
            adjusted += 1;
        }

        self.stats
            .lock()
            .expect("feedback stats poisoned")
            .record(outcome, delta, adjusted);

        tracing::debug!(
            generation_id = %generation.generation_id,
            outcome = ?outcome,
            adjusted,
            feedback = feedback.unwrap_or(""),
            "processed outcome"
        );
        Ok(adjusted)
    }

    /// Snapshot of the running aggregate.
    pub fn stats(&self) -> FeedbackStats {
        self.stats.lock().expect("feedback stats poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_storage::StorageEngine;
    use test_fixtures::{tribal, with_confidence};

    fn setup() -> (FeedbackProcessor, Arc<StorageEngine>) {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        (
            FeedbackProcessor::new(Arc::clone(&storage) as Arc<dyn IMemoryStorage>),
            storage,
        )
    }

    fn generation(ids: &[&str]) -> GenerationContext {
        GenerationContext {
            generation_id: "gen_1".to_string(),
            influences: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn accepted_boosts_influences() {
        let (processor, storage) = setup();
        let memory = with_confidence(tribal("helpful guidance"), 0.5);
        storage.create(&memory).unwrap();

        let adjusted = processor
            .process_outcome(&generation(&[&memory.id]), MemoryOutcome::Accepted, None)
            .unwrap();
        assert_eq!(adjusted, 1);

        let loaded = storage.get(&memory.id).unwrap().unwrap();
        assert!((loaded.confidence.value() - 0.55).abs() < 1e-9);
        assert_eq!(loaded.access_count, 1);
    }

    #[test]
    fn rejected_cuts_deeper_than_modified() {
        let (processor, storage) = setup();
        let modified = with_confidence(tribal("tweaked advice"), 0.5);
        let rejected = with_confidence(tribal("bad advice"), 0.5);
        storage.create(&modified).unwrap();
        storage.create(&rejected).unwrap();

        processor
            .process_outcome(&generation(&[&modified.id]), MemoryOutcome::Modified, None)
            .unwrap();
        processor
            .process_outcome(
                &generation(&[&rejected.id]),
                MemoryOutcome::Rejected,
                Some("wrong pattern"),
            )
            .unwrap();

        let m = storage.get(&modified.id).unwrap().unwrap();
        let r = storage.get(&rejected.id).unwrap().unwrap();
        assert!((m.confidence.value() - 0.48).abs() < 1e-9);
        assert!((r.confidence.value() - 0.40).abs() < 1e-9);
    }

    #[test]
    fn adjustment_clamps_at_bounds() {
        let (processor, storage) = setup();
        let memory = with_confidence(tribal("already certain"), 0.99);
        storage.create(&memory).unwrap();

        processor
            .process_outcome(&generation(&[&memory.id]), MemoryOutcome::Accepted, None)
            .unwrap();
        let loaded = storage.get(&memory.id).unwrap().unwrap();
        assert_eq!(loaded.confidence.value(), 1.0);
    }

    #[test]
    fn missing_influences_are_skipped() {
        let (processor, storage) = setup();
        let memory = with_confidence(tribal("real influence"), 0.5);
        storage.create(&memory).unwrap();

        let adjusted = processor
            .process_outcome(
                &generation(&[&memory.id, "mem_ghost_00000000"]),
                MemoryOutcome::Accepted,
                None,
            )
            .unwrap();
        assert_eq!(adjusted, 1);
    }

    #[test]
    fn stats_aggregate_outcomes() {
        let (processor, storage) = setup();
        let memory = with_confidence(tribal("tracked influence"), 0.5);
        storage.create(&memory).unwrap();

        processor
            .process_outcome(&generation(&[&memory.id]), MemoryOutcome::Accepted, None)
            .unwrap();
        processor
            .process_outcome(&generation(&[&memory.id]), MemoryOutcome::Rejected, None)
            .unwrap();

        let stats = processor.stats();
        assert_eq!(stats.total_outcomes, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 1);
        assert!((stats.acceptance_rate() - 0.5).abs() < f64::EPSILON);
    }
}
