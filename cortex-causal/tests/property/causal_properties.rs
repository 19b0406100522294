use std::sync::Arc;

use cortex_causal::{CausalGraph, EdgeRequest};
use cortex_core::models::{CausalEvidence, CausalRelation, EvidenceType};
use cortex_core::traits::{ICausalStorage, IMemoryStorage};
use cortex_storage::StorageEngine;
use proptest::prelude::*;
use test_fixtures::tribal;

fn setup() -> (CausalGraph, Arc<StorageEngine>) {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let graph = CausalGraph::new(
        Arc::clone(&storage) as Arc<dyn ICausalStorage>,
        Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
    );
    (graph, storage)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Repeated creation of the same (source, target, relation) converges
    // on one edge carrying the max strength, whatever the order.
    #[test]
    fn edge_merge_is_commutative(strengths in prop::collection::vec(0.0f64..1.0, 1..6)) {
        let (graph, storage) = setup();
        let a = tribal("merge source");
        let b = tribal("merge target");
        storage.create(&a).unwrap();
        storage.create(&b).unwrap();

        for s in &strengths {
            graph.create_edge(
                EdgeRequest::new(&a.id, &b.id, CausalRelation::Supports).with_strength(*s),
            ).unwrap();
        }

        let edges = storage.get_edges(&a.id).unwrap();
        prop_assert_eq!(edges.len(), 1);
        let expected = strengths.iter().cloned().fold(0.0f64, f64::max);
        prop_assert!((edges[0].strength - expected).abs() < 1e-12);
    }

    // Stored strength is always within [0, 1] no matter the input.
    #[test]
    fn strength_is_always_clamped(raw in -10.0f64..10.0) {
        let (graph, storage) = setup();
        let a = tribal("clamp source");
        let b = tribal("clamp target");
        storage.create(&a).unwrap();
        storage.create(&b).unwrap();

        let edge = graph.create_edge(
            EdgeRequest::new(&a.id, &b.id, CausalRelation::Caused).with_strength(raw),
        ).unwrap();
        prop_assert!((0.0..=1.0).contains(&edge.strength));
    }

    // However supersedes edges are requested, the
    // accepted subset never contains a cycle.
    #[test]
    fn supersedes_stays_acyclic(pairs in prop::collection::vec((0usize..5, 0usize..5), 0..15)) {
        let (graph, storage) = setup();
        let memories: Vec<_> = (0..5).map(|i| tribal(&format!("version {i}"))).collect();
        for m in &memories {
            storage.create(m).unwrap();
        }

        for (from, to) in pairs {
            if from == to {
                continue;
            }
            // Cycle-closing requests error; the rest must keep the DAG.
            let _ = graph.create_edge(EdgeRequest::new(
                &memories[from].id,
                &memories[to].id,
                CausalRelation::Supersedes,
            ));
        }

        // Kahn's check over accepted supersedes edges.
        let edges: Vec<(String, String)> = storage
            .get_all_edges(false)
            .unwrap()
            .into_iter()
            .filter(|e| e.relation == CausalRelation::Supersedes)
            .map(|e| (e.source_id, e.target_id))
            .collect();
        prop_assert!(is_acyclic(&edges));
    }

    // Merged evidence never loses entries.
    #[test]
    fn evidence_accumulates(descriptions in prop::collection::hash_set("[a-z]{4,12}", 1..5)) {
        let (graph, storage) = setup();
        let a = tribal("evidence source");
        let b = tribal("evidence target");
        storage.create(&a).unwrap();
        storage.create(&b).unwrap();

        for description in &descriptions {
            let mut request = EdgeRequest::new(&a.id, &b.id, CausalRelation::Supports);
            request.evidence = vec![CausalEvidence {
                evidence_type: EvidenceType::Semantic,
                description: description.clone(),
                confidence: 0.5,
                detected_at: cortex_core::identity::monotonic_now(),
            }];
            graph.create_edge(request).unwrap();
        }

        let edges = storage.get_edges(&a.id).unwrap();
        prop_assert_eq!(edges[0].evidence.len(), descriptions.len());
    }
}

fn is_acyclic(edges: &[(String, String)]) -> bool {
    use std::collections::{HashMap, HashSet, VecDeque};
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    let mut nodes: HashSet<&str> = HashSet::new();
    for (from, to) in edges {
        adjacency.entry(from).or_default().push(to);
        *indegree.entry(to).or_default() += 1;
        nodes.insert(from);
        nodes.insert(to);
    }
    let mut queue: VecDeque<&str> = nodes
        .iter()
        .filter(|n| indegree.get(**n).copied().unwrap_or(0) == 0)
        .copied()
        .collect();
    let mut seen = 0;
    while let Some(node) = queue.pop_front() {
        seen += 1;
        for next in adjacency.get(node).into_iter().flatten() {
            let d = indegree.get_mut(*next).unwrap();
            *d -= 1;
            if *d == 0 {
                queue.push_back(next);
            }
        }
    }
    seen == nodes.len()
}
