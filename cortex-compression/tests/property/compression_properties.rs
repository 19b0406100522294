use cortex_compression::{compress_batch, levels, EmptyNeighborhood, MemoryNeighborhood};
use cortex_core::config::CompressionConfig;
use cortex_core::memory::types::TribalContent;
use cortex_core::memory::{BaseMemory, TypedContent};
use cortex_core::models::CompressionLevel;
use cortex_tokens::HeuristicEstimator;
use proptest::prelude::*;

fn memory_with(summary: String, knowledge: String) -> BaseMemory {
    BaseMemory::new(
        TypedContent::Tribal(TribalContent {
            knowledge,
            ..Default::default()
        }),
        if summary.trim().is_empty() {
            "fallback summary".to_string()
        } else {
            summary
        },
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Packed batches never exceed the budget, and every item appears.
    #[test]
    fn batch_stays_within_budget(
        summaries in prop::collection::vec("[a-z ]{1,120}", 1..8),
        budget in 200usize..2000,
    ) {
        let estimator = HeuristicEstimator;
        let memories: Vec<BaseMemory> = summaries
            .into_iter()
            .map(|s| memory_with(s.clone(), s))
            .collect();

        let result = compress_batch(
            &memories,
            budget,
            &CompressionConfig::default(),
            &estimator,
            &EmptyNeighborhood,
        );
        // With budgets this size the floor always fits, so packing succeeds.
        let result = result.unwrap();
        prop_assert!(result.total_tokens <= budget);
        prop_assert_eq!(result.compressed.len(), memories.len());

        let reported: usize = result.compressed.iter().map(|c| c.token_count()).sum();
        prop_assert_eq!(reported, result.total_tokens);
    }

    // Every projection respects its level ceiling after selection.
    #[test]
    fn selected_levels_respect_ceilings(
        summary in "[a-z ]{1,200}",
        knowledge in "[a-z ]{0,2000}",
    ) {
        let estimator = HeuristicEstimator;
        let memory = memory_with(summary, knowledge);
        let result = compress_batch(
            &[memory],
            10_000,
            &CompressionConfig::default(),
            &estimator,
            &EmptyNeighborhood,
        ).unwrap();
        let item = &result.compressed[0];
        prop_assert!(item.token_count() <= item.level().max_tokens());
    }

    // The L0 projection of anything fits the L0 ceiling.
    #[test]
    fn l0_always_fits(summary in "[a-z ]{1,400}") {
        let estimator = HeuristicEstimator;
        let memory = memory_with(summary.clone(), summary);
        let projection = levels::project(
            &memory,
            CompressionLevel::L0,
            &estimator,
            &MemoryNeighborhood::default(),
        );
        prop_assert!(projection.token_count() <= CompressionLevel::L0.max_tokens());
    }
}
