use std::sync::Arc;

use cortex_core::config::DecayConfig;
use cortex_core::memory::MemoryQuery;
use cortex_core::traits::IMemoryStorage;
use cortex_decay::DecayEngine;
use cortex_storage::StorageEngine;
use proptest::prelude::*;
use test_fixtures::{aged, episode, tribal, with_confidence};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Decay never increases confidence and never un-archives.
    #[test]
    fn decay_is_monotone_down(
        confidences in prop::collection::vec(0.0f64..1.0, 1..8),
        ages in prop::collection::vec(0i64..400, 1..8),
    ) {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let engine = DecayEngine::new(
            Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
            DecayConfig::default(),
        );

        let n = confidences.len().min(ages.len());
        let mut before = std::collections::HashMap::new();
        for i in 0..n {
            let memory = aged(
                with_confidence(episode("general", &format!("episode {i}"), &[]), confidences[i]),
                ages[i],
            );
            before.insert(memory.id.clone(), memory.confidence.value());
            storage.create(&memory).unwrap();
        }
        // One pre-archived memory that must stay archived.
        let archived = tribal("already archived");
        storage.create(&archived).unwrap();
        storage.archive(&archived.id, "manual").unwrap();

        engine.apply_decay().unwrap();

        let after = storage.search(&MemoryQuery {
            include_archived: true,
            ..Default::default()
        }).unwrap();
        for memory in &after {
            if let Some(old) = before.get(&memory.id) {
                prop_assert!(memory.confidence.value() <= old + 1e-9);
            }
        }
        let still_archived = after.iter().find(|m| m.id == archived.id).unwrap();
        prop_assert!(still_archived.archived);
    }

    // Running decay twice in a row only ever lowers further, and the report
    // accounts for every live memory.
    #[test]
    fn repeated_decay_compounds(age in 1i64..100) {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let engine = DecayEngine::new(
            Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
            DecayConfig::default(),
        );
        let memory = aged(with_confidence(tribal("compounding"), 0.9), age);
        storage.create(&memory).unwrap();

        let first = engine.apply_decay().unwrap();
        prop_assert_eq!(first.processed, 1);
        let mid = storage.get(&memory.id).unwrap().unwrap().confidence.value();

        engine.apply_decay().unwrap();
        let end = storage.get(&memory.id).unwrap().unwrap().confidence.value();
        prop_assert!(end <= mid + 1e-9);
    }
}
