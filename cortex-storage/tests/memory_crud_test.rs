use cortex_core::memory::{MemoryPatch, MemoryQuery, MemoryType, OrderBy, OrderDir};
use cortex_core::models::{CausalEdge, CausalRelation};
use cortex_core::traits::{ICausalStorage, IMemoryStorage};
use cortex_core::CortexError;
use cortex_storage::StorageEngine;
use test_fixtures::{tribal, with_confidence};

#[test]
fn create_then_get_round_trips() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = tribal("error boundaries live at route level");
    let id = engine.create(&memory).unwrap();
    assert_eq!(id, memory.id);

    let loaded = engine.get(&id).unwrap().unwrap();
    assert_eq!(loaded.summary, memory.summary);
    assert_eq!(loaded.memory_type, MemoryType::Tribal);
    assert_eq!(loaded.content_hash, memory.content_hash);
}

#[test]
fn get_unknown_returns_none() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert!(engine.get("mem_nope_00000000").unwrap().is_none());
}

#[test]
fn update_merges_partial_and_bumps_updated_at() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = tribal("original knowledge");
    engine.create(&memory).unwrap();

    let patch = MemoryPatch {
        confidence: Some(0.42),
        tags: Some(vec!["deploy".to_string()]),
        ..Default::default()
    };
    let updated = engine.update(&memory.id, &patch).unwrap();
    assert_eq!(updated.confidence.value(), 0.42);
    assert_eq!(updated.tags, vec!["deploy".to_string()]);
    assert!(updated.updated_at >= memory.updated_at);
    // Untouched fields survive.
    assert_eq!(updated.summary, memory.summary);
}

#[test]
fn update_unknown_id_fails_not_found() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let err = engine
        .update("mem_missing_00000000", &MemoryPatch::confidence(0.5))
        .unwrap_err();
    assert!(matches!(err, CortexError::MemoryNotFound { .. }));
}

#[test]
fn update_archived_fails_until_restored() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = tribal("soft-deleted knowledge");
    engine.create(&memory).unwrap();
    engine.archive(&memory.id, "obsolete").unwrap();

    let err = engine
        .update(&memory.id, &MemoryPatch::confidence(0.5))
        .unwrap_err();
    assert!(matches!(err, CortexError::MemoryArchived { .. }));

    engine.restore(&memory.id).unwrap();
    assert!(engine
        .update(&memory.id, &MemoryPatch::confidence(0.5))
        .is_ok());
}

#[test]
fn archived_memories_hidden_from_default_search() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let live = tribal("live memory");
    let dead = tribal("archived memory");
    engine.create(&live).unwrap();
    engine.create(&dead).unwrap();
    engine.archive(&dead.id, "decayed").unwrap();

    let found = engine.search(&MemoryQuery::default()).unwrap();
    assert!(found.iter().any(|m| m.id == live.id));
    assert!(!found.iter().any(|m| m.id == dead.id));

    // With include_archived, both are visible and the archived one carries
    // its reason.
    let all = engine
        .search(&MemoryQuery {
            include_archived: true,
            ..Default::default()
        })
        .unwrap();
    let archived = all.iter().find(|m| m.id == dead.id).unwrap();
    assert_eq!(archived.archive_reason.as_deref(), Some("decayed"));
}

#[test]
fn delete_tombstones_incident_edges() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let a = tribal("cause");
    let b = tribal("effect");
    engine.create(&a).unwrap();
    engine.create(&b).unwrap();

    let edge = CausalEdge {
        id: cortex_core::identity::new_edge_id(),
        source_id: a.id.clone(),
        target_id: b.id.clone(),
        relation: CausalRelation::Caused,
        strength: 0.8,
        evidence: vec![],
        created_at: chrono::Utc::now(),
        validated_at: None,
        inferred: false,
        created_by: None,
        tombstone: false,
    };
    engine.insert_edge(&edge).unwrap();
    assert_eq!(engine.edge_count().unwrap(), 1);

    engine.delete(&a.id).unwrap();
    // The edge row survives but is tombstoned, so live count drops.
    assert_eq!(engine.edge_count().unwrap(), 0);
    let all = engine.get_all_edges(true).unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].tombstone);
}

#[test]
fn search_orders_and_pages() {
    let engine = StorageEngine::open_in_memory().unwrap();
    for (text, conf) in [("low", 0.2), ("mid", 0.5), ("high", 0.9)] {
        engine
            .create(&with_confidence(tribal(text), conf))
            .unwrap();
    }

    let by_confidence = engine
        .search(&MemoryQuery {
            order_by: OrderBy::Confidence,
            order_dir: OrderDir::Desc,
            ..Default::default()
        })
        .unwrap();
    let values: Vec<f64> = by_confidence
        .iter()
        .map(|m| m.confidence.value())
        .collect();
    assert_eq!(values, vec![0.9, 0.5, 0.2]);

    let page = engine
        .search(&MemoryQuery {
            order_by: OrderBy::Confidence,
            order_dir: OrderDir::Desc,
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].confidence.value(), 0.5);
}

#[test]
fn confidence_filters_apply() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.create(&with_confidence(tribal("weak"), 0.1)).unwrap();
    engine
        .create(&with_confidence(tribal("strong"), 0.9))
        .unwrap();

    let strong = engine
        .search(&MemoryQuery {
            min_confidence: Some(0.5),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(strong.len(), 1);
    assert_eq!(strong[0].summary, "strong");
}

#[test]
fn supersedes_cycle_is_rejected() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let a = tribal("version one");
    let b = tribal("version two");
    engine.create(&a).unwrap();
    engine.create(&b).unwrap();

    // b supersedes a — fine.
    engine
        .update(
            &b.id,
            &MemoryPatch {
                supersedes: Some(Some(a.id.clone())),
                ..Default::default()
            },
        )
        .unwrap();

    // a superseding b would close the loop.
    let err = engine
        .update(
            &a.id,
            &MemoryPatch {
                supersedes: Some(Some(b.id.clone())),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, CortexError::IntegrityViolation { .. }));
}

#[test]
fn supersedes_sets_reciprocal_pointer() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let old = tribal("old guidance");
    let new = tribal("new guidance");
    engine.create(&old).unwrap();
    engine.create(&new).unwrap();

    engine
        .update(
            &new.id,
            &MemoryPatch {
                supersedes: Some(Some(old.id.clone())),
                ..Default::default()
            },
        )
        .unwrap();

    let old_loaded = engine.get(&old.id).unwrap().unwrap();
    assert_eq!(old_loaded.superseded_by.as_deref(), Some(new.id.as_str()));
}

#[test]
fn record_access_bumps_counters() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = tribal("frequently used");
    engine.create(&memory).unwrap();

    engine.record_access(&[memory.id.clone()]).unwrap();
    engine.record_access(&[memory.id.clone()]).unwrap();

    let loaded = engine.get(&memory.id).unwrap().unwrap();
    assert_eq!(loaded.access_count, 2);
    assert!(loaded.last_accessed >= memory.last_accessed);
}

#[test]
fn summary_update_invalidates_stored_embedding() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let memory = tribal("original summary");
    engine.create(&memory).unwrap();
    engine
        .put_embedding(&memory.id, "test", &[0.1, 0.2, 0.3])
        .unwrap();
    assert!(engine.get_embedding(&memory.id, "test").unwrap().is_some());

    engine
        .update(&memory.id, &MemoryPatch::summary("rewritten summary"))
        .unwrap();
    assert!(engine.get_embedding(&memory.id, "test").unwrap().is_none());
}

#[test]
fn fts_search_finds_by_keyword() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine
        .create(&tribal("error boundaries live at route level"))
        .unwrap();
    engine.create(&tribal("always paginate queries")).unwrap();

    let hits = engine.search_text("error boundary", 5).unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].summary.contains("error boundaries"));
}

#[test]
fn import_skips_duplicate_hashes() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let original = tribal("shared wisdom");
    engine.create(&original).unwrap();

    // Same content, different id: a duplicate by hash.
    let duplicate = tribal("shared wisdom");
    let fresh = tribal("new wisdom");

    let report = engine.import_bulk(&[duplicate, fresh]).unwrap();
    assert_eq!(report.imported, 1);
    assert_eq!(report.skipped, 1);
    assert!(report.errors.is_empty());
}

#[test]
fn count_by_type_groups_live_memories() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.create(&tribal("one")).unwrap();
    engine.create(&tribal("two")).unwrap();
    engine
        .create(&test_fixtures::semantic("topic", "knowledge"))
        .unwrap();

    let counts = engine.count_by_type().unwrap();
    let tribal_count = counts
        .iter()
        .find(|(t, _)| *t == MemoryType::Tribal)
        .map(|(_, n)| *n);
    assert_eq!(tribal_count, Some(2));
}
