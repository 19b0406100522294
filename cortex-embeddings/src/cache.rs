//! Two-tier embedding cache.
//!
//! L1 is a moka cache keyed by `{provider}:{blake3(summary)}` — a summary
//! change produces a new key, so stale vectors can never be served. L2 is the
//! embeddings table, keyed `(memory_id, provider)` and deleted by the store
//! when a summary changes. Concurrent misses for the same key converge on
//! the same entry; a rare double-compute writes the identical vector.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::BaseMemory;
use cortex_core::traits::{IEmbeddingProvider, IMemoryStorage};

/// Default L1 capacity.
const DEFAULT_L1_ENTRIES: u64 = 50_000;

/// The shared embedding cache.
pub struct EmbeddingCache {
    provider: Arc<dyn IEmbeddingProvider>,
    storage: Arc<dyn IMemoryStorage>,
    l1: Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    pub fn new(provider: Arc<dyn IEmbeddingProvider>, storage: Arc<dyn IMemoryStorage>) -> Self {
        let l1 = Cache::builder()
            .max_capacity(DEFAULT_L1_ENTRIES)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self {
            provider,
            storage,
            l1,
        }
    }

    /// Provider name, part of every cache key.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether the underlying provider can serve right now.
    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    /// Embed a memory's summary, consulting L1, then L2, then the provider.
    /// The computed vector is written through to both tiers.
    pub fn embed_memory(&self, memory: &BaseMemory) -> CortexResult<Arc<Vec<f32>>> {
        let key = self.l1_key(&memory.summary);

        if let Some(vector) = self.l1.get(&key) {
            return Ok(vector);
        }

        // L2: the persistent row survives restarts and is invalidated by the
        // store whenever the summary changes.
        if let Some(vector) = self
            .storage
            .get_embedding(&memory.id, self.provider.name())?
        {
            let vector = Arc::new(vector);
            self.l1.insert(key, Arc::clone(&vector));
            return Ok(vector);
        }

        if !self.provider.is_available() {
            return Err(CortexError::ProviderUnavailable {
                name: self.provider.name().to_string(),
            });
        }

        let vector = Arc::new(self.provider.embed(&memory.summary)?);
        self.storage
            .put_embedding(&memory.id, self.provider.name(), &vector)?;
        self.l1.insert(key, Arc::clone(&vector));
        Ok(vector)
    }

    /// Embed free query text. Cached in L1 only — queries have no memory row.
    pub fn embed_query(&self, text: &str) -> CortexResult<Arc<Vec<f32>>> {
        if !self.provider.is_available() {
            return Err(CortexError::ProviderUnavailable {
                name: self.provider.name().to_string(),
            });
        }
        let key = self.l1_key(text);
        if let Some(vector) = self.l1.get(&key) {
            return Ok(vector);
        }
        let vector = Arc::new(self.provider.embed(text)?);
        self.l1.insert(key, Arc::clone(&vector));
        Ok(vector)
    }

    /// Embed a batch of memories, writing each through both tiers.
    /// Per-item failures are logged and skipped; the batch continues.
    pub fn embed_batch(&self, memories: &[BaseMemory]) -> CortexResult<usize> {
        if !self.provider.is_available() {
            return Err(CortexError::ProviderUnavailable {
                name: self.provider.name().to_string(),
            });
        }
        let texts: Vec<String> = memories.iter().map(|m| m.summary.clone()).collect();
        let vectors = self.provider.embed_batch(&texts)?;

        let mut stored = 0;
        for (memory, vector) in memories.iter().zip(vectors) {
            match self
                .storage
                .put_embedding(&memory.id, self.provider.name(), &vector)
            {
                Ok(()) => {
                    self.l1
                        .insert(self.l1_key(&memory.summary), Arc::new(vector));
                    stored += 1;
                }
                Err(e) => {
                    tracing::warn!(memory_id = %memory.id, error = %e, "failed to store embedding");
                }
            }
        }
        Ok(stored)
    }

    /// Number of vectors in the L1 tier.
    pub fn l1_len(&self) -> u64 {
        self.l1.entry_count()
    }

    fn l1_key(&self, text: &str) -> String {
        format!(
            "{}:{}",
            self.provider.name(),
            blake3::hash(text.as_bytes()).to_hex()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::traits::IMemoryStorage;
    use cortex_storage::StorageEngine;
    use test_fixtures::{tribal, HashEmbedder, OfflineEmbedder};

    fn cache_with(provider: Arc<dyn IEmbeddingProvider>) -> (EmbeddingCache, Arc<StorageEngine>) {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        (
            EmbeddingCache::new(provider, Arc::clone(&storage) as Arc<dyn IMemoryStorage>),
            storage,
        )
    }

    #[test]
    fn embed_memory_writes_through_both_tiers() {
        let (cache, storage) = cache_with(Arc::new(HashEmbedder::default()));
        let memory = tribal("write-through subject");
        storage.create(&memory).unwrap();

        let vector = cache.embed_memory(&memory).unwrap();
        assert_eq!(vector.len(), 64);
        assert!(storage
            .get_embedding(&memory.id, "hash-test")
            .unwrap()
            .is_some());
        assert_eq!(cache.l1_len(), 1);
    }

    #[test]
    fn summary_change_produces_new_vector() {
        let (cache, storage) = cache_with(Arc::new(HashEmbedder::default()));
        let mut memory = tribal("the original summary text");
        storage.create(&memory).unwrap();
        let before = cache.embed_memory(&memory).unwrap();

        // Simulate the store's update path: summary changed, L2 invalidated.
        memory.summary = "a completely different summary".to_string();
        storage.delete_embeddings(&memory.id).unwrap();

        let after = cache.embed_memory(&memory).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn unavailable_provider_surfaces_as_such() {
        let (cache, storage) = cache_with(Arc::new(OfflineEmbedder));
        let memory = tribal("unreachable");
        storage.create(&memory).unwrap();
        let err = cache.embed_memory(&memory).unwrap_err();
        assert!(matches!(err, CortexError::ProviderUnavailable { .. }));
    }
}
