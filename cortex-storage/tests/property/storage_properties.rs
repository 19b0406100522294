use cortex_core::memory::{MemoryPatch, MemoryQuery};
use cortex_core::traits::IMemoryStorage;
use cortex_storage::StorageEngine;
use proptest::prelude::*;
use test_fixtures::tribal;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Every created memory gets a distinct id.
    #[test]
    fn created_ids_are_unique(count in 1usize..20) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let mut ids = std::collections::HashSet::new();
        for i in 0..count {
            let id = engine.create(&tribal(&format!("memory number {i}"))).unwrap();
            prop_assert!(ids.insert(id));
        }
    }

    // Applying the same patch twice equals applying it once,
    // modulo updated_at.
    #[test]
    fn update_is_idempotent(confidence in 0.0f64..1.0, summary in "[a-z ]{1,40}") {
        let engine = StorageEngine::open_in_memory().unwrap();
        let memory = tribal("idempotence subject");
        engine.create(&memory).unwrap();

        let patch = MemoryPatch {
            confidence: Some(confidence),
            summary: Some(summary),
            ..Default::default()
        };
        let once = engine.update(&memory.id, &patch).unwrap();
        let twice = engine.update(&memory.id, &patch).unwrap();
        prop_assert_eq!(once.summary, twice.summary);
        prop_assert_eq!(once.confidence.value(), twice.confidence.value());
        prop_assert_eq!(once.content_hash, twice.content_hash);
        prop_assert_eq!(once.access_count, twice.access_count);
    }

    // Access counters never decrease.
    #[test]
    fn access_counters_are_monotone(bumps in 0usize..10) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let memory = tribal("telemetry subject");
        engine.create(&memory).unwrap();

        let mut last_count = 0;
        for _ in 0..bumps {
            engine.record_access(&[memory.id.clone()]).unwrap();
            let loaded = engine.get(&memory.id).unwrap().unwrap();
            prop_assert!(loaded.access_count >= last_count);
            prop_assert!(loaded.last_accessed >= loaded.created_at);
            last_count = loaded.access_count;
        }
    }

    // Confidence written through any patch stays in [0, 1].
    #[test]
    fn stored_confidence_is_clamped(raw in -5.0f64..5.0) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let memory = tribal("clamp subject");
        engine.create(&memory).unwrap();
        let updated = engine.update(&memory.id, &MemoryPatch::confidence(raw)).unwrap();
        prop_assert!((0.0..=1.0).contains(&updated.confidence.value()));
    }

    // Default search never yields archived rows.
    #[test]
    fn default_search_excludes_archived(archive_mask in prop::collection::vec(any::<bool>(), 1..10)) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let mut archived_ids = std::collections::HashSet::new();
        for (i, archive) in archive_mask.iter().enumerate() {
            let memory = tribal(&format!("memory {i}"));
            engine.create(&memory).unwrap();
            if *archive {
                engine.archive(&memory.id, "test").unwrap();
                archived_ids.insert(memory.id);
            }
        }
        let found = engine.search(&MemoryQuery::default()).unwrap();
        for m in &found {
            prop_assert!(!archived_ids.contains(&m.id));
        }
        prop_assert_eq!(found.len(), archive_mask.len() - archived_ids.len());
    }
}
