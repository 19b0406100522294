use std::sync::Arc;

use cortex_causal::{traversal, CausalGraph, EdgeRequest, TraversalOptions};
use cortex_core::identity;
use cortex_core::models::{CausalEvidence, CausalRelation, EvidenceType};
use cortex_core::traits::{ICausalStorage, IMemoryStorage};
use cortex_core::CortexError;
use cortex_storage::StorageEngine;
use test_fixtures::tribal;

fn setup() -> (CausalGraph, Arc<StorageEngine>) {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let graph = CausalGraph::new(
        Arc::clone(&storage) as Arc<dyn ICausalStorage>,
        Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
    );
    (graph, storage)
}

fn evidence(description: &str) -> CausalEvidence {
    CausalEvidence {
        evidence_type: EvidenceType::Explicit,
        description: description.to_string(),
        confidence: 0.9,
        detected_at: identity::monotonic_now(),
    }
}

#[test]
fn create_edge_normalizes_strength() {
    let (graph, storage) = setup();
    let a = tribal("cause");
    let b = tribal("effect");
    storage.create(&a).unwrap();
    storage.create(&b).unwrap();

    // Out-of-range strength clamps; omitted strength defaults to 0.5.
    let clamped = graph
        .create_edge(EdgeRequest::new(&a.id, &b.id, CausalRelation::Caused).with_strength(3.0))
        .unwrap();
    assert_eq!(clamped.strength, 1.0);

    let defaulted = graph
        .create_edge(EdgeRequest::new(&a.id, &b.id, CausalRelation::Enabled))
        .unwrap();
    assert_eq!(defaulted.strength, 0.5);
}

#[test]
fn self_loops_are_rejected() {
    let (graph, storage) = setup();
    let a = tribal("narcissist");
    storage.create(&a).unwrap();
    let err = graph
        .create_edge(EdgeRequest::new(&a.id, &a.id, CausalRelation::Supports))
        .unwrap_err();
    assert!(matches!(err, CortexError::CausalError(_)));
}

#[test]
fn missing_endpoint_is_integrity_violation() {
    let (graph, storage) = setup();
    let a = tribal("real");
    storage.create(&a).unwrap();
    let err = graph
        .create_edge(EdgeRequest::new(&a.id, "mem_ghost_00000000", CausalRelation::Caused))
        .unwrap_err();
    assert!(matches!(err, CortexError::IntegrityViolation { .. }));
}

#[test]
fn duplicate_creation_merges_evidence_and_takes_max_strength() {
    let (graph, storage) = setup();
    let a = tribal("cause");
    let b = tribal("effect");
    storage.create(&a).unwrap();
    storage.create(&b).unwrap();

    let mut first = EdgeRequest::new(&a.id, &b.id, CausalRelation::Caused).with_strength(0.4);
    first.evidence = vec![evidence("observed in review")];
    let mut second = EdgeRequest::new(&a.id, &b.id, CausalRelation::Caused).with_strength(0.8);
    second.evidence = vec![evidence("confirmed by tests")];

    let e1 = graph.create_edge(first).unwrap();
    let e2 = graph.create_edge(second).unwrap();

    // Same edge row, merged.
    assert_eq!(e1.id, e2.id);
    assert_eq!(e2.strength, 0.8);
    assert_eq!(e2.evidence.len(), 2);
    assert_eq!(storage.edge_count().unwrap(), 1);
}

#[test]
fn supersedes_cycles_are_rejected() {
    let (graph, storage) = setup();
    let a = tribal("v1");
    let b = tribal("v2");
    let c = tribal("v3");
    for m in [&a, &b, &c] {
        storage.create(m).unwrap();
    }

    graph
        .create_edge(EdgeRequest::new(&a.id, &b.id, CausalRelation::Supersedes))
        .unwrap();
    graph
        .create_edge(EdgeRequest::new(&b.id, &c.id, CausalRelation::Supersedes))
        .unwrap();

    // c -> a would close the loop transitively.
    let err = graph
        .create_edge(EdgeRequest::new(&c.id, &a.id, CausalRelation::Supersedes))
        .unwrap_err();
    assert!(matches!(err, CortexError::CausalError(_)));
}

#[test]
fn traversal_respects_bounds() {
    let (graph, storage) = setup();
    let memories: Vec<_> = (0..6).map(|i| tribal(&format!("node {i}"))).collect();
    for m in &memories {
        storage.create(m).unwrap();
    }
    // Chain 0 -> 1 -> 2 -> 3 -> 4 -> 5.
    for pair in memories.windows(2) {
        graph
            .create_edge(
                EdgeRequest::new(&pair[0].id, &pair[1].id, CausalRelation::Caused)
                    .with_strength(0.9),
            )
            .unwrap();
    }

    let shallow = traversal::traverse(
        graph.storage(),
        &memories[0].id,
        &TraversalOptions {
            max_depth: 2,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(shallow.total_memories, 2);
    assert_eq!(shallow.max_depth, 2);
}

#[test]
fn traversal_filters_by_strength_and_relation() {
    let (graph, storage) = setup();
    let a = tribal("root");
    let strong = tribal("strong effect");
    let weak = tribal("weak effect");
    let contradicted = tribal("contradicted claim");
    for m in [&a, &strong, &weak, &contradicted] {
        storage.create(m).unwrap();
    }
    graph
        .create_edge(EdgeRequest::new(&a.id, &strong.id, CausalRelation::Caused).with_strength(0.9))
        .unwrap();
    graph
        .create_edge(EdgeRequest::new(&a.id, &weak.id, CausalRelation::Caused).with_strength(0.1))
        .unwrap();
    graph
        .create_edge(
            EdgeRequest::new(&a.id, &contradicted.id, CausalRelation::Contradicts)
                .with_strength(0.9),
        )
        .unwrap();

    let chain = traversal::traverse(
        graph.storage(),
        &a.id,
        &TraversalOptions {
            min_strength: 0.5,
            relation_types: Some(vec![CausalRelation::Caused]),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(chain.total_memories, 1);
    assert_eq!(chain.nodes[0].memory_id, strong.id);
}

#[test]
fn counterfactual_collects_downstream_effects() {
    // A -caused(0.8)-> B -enabled(0.6)-> C, counterfactual(A) = {B, C} at 0.48.
    let (graph, storage) = setup();
    let a = tribal("memory a");
    let b = tribal("memory b");
    let c = tribal("memory c");
    for m in [&a, &b, &c] {
        storage.create(m).unwrap();
    }
    graph
        .create_edge(EdgeRequest::new(&a.id, &b.id, CausalRelation::Caused).with_strength(0.8))
        .unwrap();
    graph
        .create_edge(EdgeRequest::new(&b.id, &c.id, CausalRelation::Enabled).with_strength(0.6))
        .unwrap();

    let chain =
        traversal::counterfactual(graph.storage(), &a.id, &TraversalOptions::default()).unwrap();
    let affected: Vec<&str> = chain.nodes.iter().map(|n| n.memory_id.as_str()).collect();
    assert_eq!(affected.len(), 2);
    assert!(affected.contains(&b.id.as_str()));
    assert!(affected.contains(&c.id.as_str()));
    assert!((chain.chain_confidence - 0.48).abs() < 1e-9);
}

#[test]
fn traversal_of_unknown_root_is_empty() {
    let (graph, _storage) = setup();
    let chain = traversal::traverse(
        graph.storage(),
        "mem_ghost_00000000",
        &TraversalOptions::default(),
    )
    .unwrap();
    assert_eq!(chain.total_memories, 0);
    assert_eq!(chain.chain_confidence, 0.0);
}
