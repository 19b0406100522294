use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};

use cortex_causal::{traversal, CausalGraph, EdgeRequest, TraversalOptions};
use cortex_core::models::CausalRelation;
use cortex_core::traits::{ICausalStorage, IMemoryStorage};
use cortex_storage::StorageEngine;
use test_fixtures::tribal;

/// Build a DAG with ~1K edges: 200 nodes, up to 5 forward edges per node.
fn build_1k_edge_store() -> (Arc<StorageEngine>, Vec<String>) {
    let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
    let graph = CausalGraph::new(
        Arc::clone(&storage) as Arc<dyn ICausalStorage>,
        Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
    );

    let n = 200;
    let ids: Vec<String> = (0..n)
        .map(|i| storage.create(&tribal(&format!("node {i}"))).unwrap())
        .collect();

    for i in 0..n {
        for j in 1..=5 {
            let target = i + j;
            if target < n {
                graph
                    .create_edge(
                        EdgeRequest::new(&ids[i], &ids[target], CausalRelation::Caused)
                            .with_strength(0.7),
                    )
                    .unwrap();
            }
        }
    }
    (storage, ids)
}

fn bench_traversal_depth_5(c: &mut Criterion) {
    let (storage, ids) = build_1k_edge_store();
    let options = TraversalOptions {
        max_depth: 5,
        max_nodes: 50,
        ..Default::default()
    };

    c.bench_function("traversal_depth_5_1k_edges", |b| {
        b.iter(|| {
            traversal::traverse(storage.as_ref() as &dyn ICausalStorage, &ids[0], &options)
                .unwrap();
        });
    });
}

fn bench_counterfactual(c: &mut Criterion) {
    let (storage, ids) = build_1k_edge_store();

    c.bench_function("counterfactual_1k_edges", |b| {
        b.iter(|| {
            traversal::counterfactual(
                storage.as_ref() as &dyn ICausalStorage,
                &ids[0],
                &TraversalOptions::default(),
            )
            .unwrap();
        });
    });
}

criterion_group!(benches, bench_traversal_depth_5, bench_counterfactual);
criterion_main!(benches);
