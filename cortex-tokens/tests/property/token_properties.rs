use cortex_core::traits::ITokenEstimator;
use cortex_tokens::{HeuristicEstimator, TokenCounter};
use proptest::prelude::*;

proptest! {
    // Determinism: the same input always produces the same count, cached or not.
    #[test]
    fn counting_is_deterministic(text in ".{0,400}") {
        let counter = TokenCounter::new();
        let first = counter.count_cached(&text);
        let second = counter.count_cached(&text);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, counter.count(&text));
    }

    // Non-empty text costs at least one token.
    #[test]
    fn nonempty_is_positive(text in ".{1,200}") {
        let counter = TokenCounter::new();
        prop_assert!(counter.count(&text) >= 1);
    }

    // The heuristic never undercounts by more than the 4-chars-per-token rule.
    #[test]
    fn heuristic_tracks_length(text in "[a-z ]{0,400}") {
        let est = HeuristicEstimator;
        prop_assert_eq!(est.estimate(&text), text.chars().count().div_ceil(4));
    }
}
