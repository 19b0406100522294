//! # cortex-tokens
//!
//! Token counting for compression and response budgeting. Wraps the
//! cl100k_base BPE behind `ITokenEstimator`, memoized by blake3 content hash
//! so repeated projections of the same memory cost one encode.

use moka::sync::Cache;
use tiktoken_rs::{cl100k_base, CoreBPE};

use cortex_core::traits::ITokenEstimator;

/// Default cache capacity — plenty for a working set of compressed memories.
const DEFAULT_CACHE_ENTRIES: u64 = 10_000;

/// BPE-backed token counter with a content-hash cache.
pub struct TokenCounter {
    bpe: CoreBPE,
    cache: Cache<String, usize>,
}

impl TokenCounter {
    /// Create a counter with the default cache size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_ENTRIES)
    }

    /// Create a counter with an explicit cache capacity.
    pub fn with_capacity(max_entries: u64) -> Self {
        let bpe = cl100k_base().expect("cl100k_base vocabulary is bundled");
        Self {
            bpe,
            cache: Cache::new(max_entries),
        }
    }

    /// Count tokens, bypassing the cache.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Count tokens with content-hash memoization.
    pub fn count_cached(&self, text: &str) -> usize {
        let key = blake3::hash(text.as_bytes()).to_hex().to_string();
        if let Some(count) = self.cache.get(&key) {
            return count;
        }
        let count = self.count(text);
        self.cache.insert(key, count);
        count
    }

    /// Entries currently cached.
    pub fn cache_len(&self) -> u64 {
        self.cache.entry_count()
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ITokenEstimator for TokenCounter {
    fn estimate(&self, text: &str) -> usize {
        self.count_cached(text)
    }
}

/// Cheap estimator for hosts that don't want the BPE: ~4 chars per token.
/// Deterministic, monotone in input length.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEstimator;

impl ITokenEstimator for HeuristicEstimator {
    fn estimate(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        let counter = TokenCounter::new();
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn cached_matches_uncached() {
        let counter = TokenCounter::new();
        let text = "error boundaries live at route level";
        assert_eq!(counter.count_cached(text), counter.count(text));
        // Second call hits the cache and must agree.
        assert_eq!(counter.count_cached(text), counter.count(text));
    }

    #[test]
    fn heuristic_is_monotone() {
        let est = HeuristicEstimator;
        assert!(est.estimate("a long sentence about pagination") >= est.estimate("short"));
    }
}
