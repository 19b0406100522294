use std::path::PathBuf;
use std::sync::Arc;

use cortex_core::memory::{Citation, MemoryPatch};
use cortex_core::models::ValidationIssue;
use cortex_core::traits::{ICausalStorage, IMemoryStorage, IPatternResolver, NullResolver};
use cortex_storage::StorageEngine;
use cortex_validation::{citation_hash, ValidationEngine};
use test_fixtures::tribal;

struct Setup {
    engine: ValidationEngine,
    storage: Arc<StorageEngine>,
    root: tempfile::TempDir,
}

fn setup() -> Setup {
    let root = tempfile::tempdir().unwrap();
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let engine = ValidationEngine::new(
        PathBuf::from(root.path()),
        Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
        Arc::clone(&storage) as Arc<dyn ICausalStorage>,
        Arc::new(NullResolver) as Arc<dyn IPatternResolver>,
    );
    Setup {
        engine,
        storage,
        root,
    }
}

fn write_source(root: &tempfile::TempDir, name: &str, lines: usize) -> String {
    let text: String = (1..=lines).map(|i| format!("line {i} of {name}\n")).collect();
    std::fs::write(root.path().join(name), &text).unwrap();
    text
}

#[test]
fn valid_citation_passes() {
    let s = setup();
    let text = write_source(&s.root, "auth.ts", 30);

    let mut memory = tribal("auth flow requires a refresh token");
    memory.linked_files.push(Citation::new(
        "auth.ts",
        10,
        20,
        citation_hash::hash_text_region(&text, 10, 20),
    ));
    s.storage.create(&memory).unwrap();

    let report = s.engine.validate(&memory);
    assert!(report.is_healthy());
}

#[test]
fn citation_drift_detected_and_healed() {
    let s = setup();
    let text = write_source(&s.root, "auth.ts", 30);

    let mut memory = tribal("auth flow requires a refresh token");
    memory.linked_files.push(Citation::new(
        "auth.ts",
        10,
        20,
        citation_hash::hash_text_region(&text, 10, 20),
    ));
    s.storage.create(&memory).unwrap();

    // Edit the cited region.
    let edited = text.replace("line 15 of auth.ts", "completely rewritten line");
    std::fs::write(s.root.path().join("auth.ts"), &edited).unwrap();

    let report = s.engine.validate(&memory);
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == ValidationIssue::CITATION_DRIFT));

    let outcome = s.engine.heal(&memory, &report).unwrap();
    assert!(!outcome.actions.is_empty());

    // After healing, the stored citation matches the edited source.
    let healed = s.storage.get(&memory.id).unwrap().unwrap();
    assert_eq!(
        healed.linked_files[0].hash,
        citation_hash::hash_text_region(&edited, 10, 20)
    );
    assert_eq!(healed.linked_files[0].valid, Some(true));
    assert!(healed.last_validated.is_some());

    let report = s.engine.validate(&healed);
    assert!(report.is_healthy());
}

#[test]
fn missing_file_is_fatal_for_citation() {
    let s = setup();
    let mut memory = tribal("cites something deleted");
    memory.linked_files.push(Citation::new(
        "deleted.ts",
        1,
        5,
        "0123456789abcdef".to_string(),
    ));
    s.storage.create(&memory).unwrap();

    let report = s.engine.validate(&memory);
    let issue = report
        .issues
        .iter()
        .find(|i| i.kind == ValidationIssue::CITATION_MISSING_FILE)
        .unwrap();
    assert_eq!(issue.severity, cortex_core::models::IssueSeverity::Major);

    // Healing cannot fix a missing file; the issue is reported as skipped.
    let outcome = s.engine.heal(&memory, &report).unwrap();
    assert!(outcome
        .skipped
        .contains(&ValidationIssue::CITATION_MISSING_FILE.to_string()));
}

#[test]
fn stale_memory_heals_with_confidence_bump() {
    let s = setup();
    let memory = test_fixtures::aged(
        test_fixtures::with_confidence(tribal("old but sound"), 0.6),
        400,
    );
    s.storage.create(&memory).unwrap();

    let (report, outcome) = s.engine.validate_and_heal(&memory).unwrap();
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == ValidationIssue::TEMPORAL_STALE));
    assert!(outcome.is_some());

    let healed = s.storage.get(&memory.id).unwrap().unwrap();
    assert!((healed.confidence.value() - 0.65).abs() < 1e-9);
    assert!(healed.last_validated.is_some());

    // Re-validating no longer reports staleness.
    let report = s.engine.validate(&healed);
    assert!(!report
        .issues
        .iter()
        .any(|i| i.kind == ValidationIssue::TEMPORAL_STALE));
}

#[test]
fn contradiction_is_surfaced_but_not_healed() {
    let s = setup();
    let claim = tribal("always use tabs");
    let counter = tribal("never use tabs");
    s.storage.create(&claim).unwrap();
    s.storage.create(&counter).unwrap();

    let edge = cortex_core::models::CausalEdge {
        id: cortex_core::identity::new_edge_id(),
        source_id: claim.id.clone(),
        target_id: counter.id.clone(),
        relation: cortex_core::models::CausalRelation::Contradicts,
        strength: 0.9,
        evidence: vec![],
        created_at: chrono::Utc::now(),
        validated_at: None,
        inferred: false,
        created_by: None,
        tombstone: false,
    };
    s.storage.insert_edge(&edge).unwrap();

    let report = s.engine.validate(&claim);
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == ValidationIssue::CONTRADICTION_ACTIVE));

    let outcome = s.engine.heal(&claim, &report).unwrap();
    assert!(outcome.actions.is_empty());
    assert!(outcome
        .skipped
        .contains(&ValidationIssue::CONTRADICTION_ACTIVE.to_string()));
}

#[test]
fn validation_runs_are_persisted() {
    use cortex_core::traits::IRunStorage;

    let s = setup();
    let memory = test_fixtures::aged(tribal("stale and recorded"), 400);
    s.storage.create(&memory).unwrap();

    let (report, outcome) = s.engine.validate_and_heal(&memory).unwrap();
    s.storage
        .record_validation_run(&report, outcome.as_ref())
        .unwrap();
}
