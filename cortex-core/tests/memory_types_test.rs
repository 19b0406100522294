use chrono::Duration;
use cortex_core::memory::types::{
    EpisodeContext, EpisodicContent, ProceduralContent, SemanticContent, TribalContent,
};
use cortex_core::memory::{BaseMemory, MemoryPatch, MemoryType, TypedContent};
use cortex_core::CortexError;

fn tribal(knowledge: &str) -> TypedContent {
    TypedContent::Tribal(TribalContent {
        knowledge: knowledge.to_string(),
        ..Default::default()
    })
}

#[test]
fn new_memory_has_fresh_telemetry() {
    let m = BaseMemory::new(tribal("error boundaries live at route level"), "boundaries").unwrap();
    assert_eq!(m.access_count, 0);
    assert_eq!(m.created_at, m.updated_at);
    assert!(m.last_accessed >= m.created_at);
    assert!(!m.archived);
    assert_eq!(m.memory_type, MemoryType::Tribal);
}

#[test]
fn content_type_mismatch_is_caught() {
    let mut m = BaseMemory::new(tribal("x"), "x").unwrap();
    m.memory_type = MemoryType::Semantic;
    assert!(matches!(
        m.check_invariants(),
        Err(CortexError::IntegrityViolation { .. })
    ));
}

#[test]
fn missing_required_fields_rejected() {
    let err = BaseMemory::new(
        TypedContent::Procedural(ProceduralContent::default()),
        "empty procedure",
    )
    .unwrap_err();
    assert!(matches!(err, CortexError::InvalidMemory { .. }));

    let err = BaseMemory::new(tribal("has knowledge"), "   ").unwrap_err();
    assert!(matches!(err, CortexError::InvalidMemory { .. }));
}

#[test]
fn valid_interval_must_be_ordered() {
    let mut m = BaseMemory::new(tribal("x"), "x").unwrap();
    m.valid_until = Some(m.valid_time - Duration::days(1));
    assert!(m.check_invariants().is_err());
    m.valid_until = Some(m.valid_time + Duration::days(1));
    assert!(m.check_invariants().is_ok());
}

#[test]
fn typed_content_serde_round_trip() {
    let content = TypedContent::Episodic(EpisodicContent {
        interaction: "added pagination to the users endpoint".to_string(),
        context: EpisodeContext {
            focus: "pagination".to_string(),
            files_touched: vec!["src/api/users.rs".to_string()],
        },
        ..Default::default()
    });
    let json = serde_json::to_string(&content).unwrap();
    assert!(json.contains("\"type\":\"episodic\""));
    let back: TypedContent = serde_json::from_str(&json).unwrap();
    assert_eq!(back, content);
    assert_eq!(back.memory_type(), MemoryType::Episodic);
}

#[test]
fn content_hash_tracks_content() {
    let a = BaseMemory::compute_content_hash(&tribal("one"));
    let b = BaseMemory::compute_content_hash(&tribal("two"));
    let a2 = BaseMemory::compute_content_hash(&tribal("one"));
    assert_ne!(a, b);
    assert_eq!(a, a2);
}

#[test]
fn patch_content_recomputes_hash() {
    let mut m = BaseMemory::new(tribal("before"), "s").unwrap();
    let original_hash = m.content_hash.clone();
    let patch = MemoryPatch {
        content: Some(tribal("after")),
        ..Default::default()
    };
    let effect = patch.apply(&mut m);
    assert!(effect.content_changed);
    assert_ne!(m.content_hash, original_hash);
}

#[test]
fn semantic_content_carries_provenance() {
    let content = TypedContent::Semantic(SemanticContent {
        topic: "pagination".to_string(),
        knowledge: "always paginate queries".to_string(),
        consolidated_from: vec!["mem_a".to_string(), "mem_b".to_string()],
        supporting_evidence: 2,
    });
    assert!(content.validate().is_ok());
}

#[test]
fn record_access_is_monotonic() {
    let mut m = BaseMemory::new(tribal("x"), "x").unwrap();
    let before = m.last_accessed;
    m.record_access();
    m.record_access();
    assert_eq!(m.access_count, 2);
    assert!(m.last_accessed >= before);
}
