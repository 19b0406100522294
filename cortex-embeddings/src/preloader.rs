//! Background embedding preloader.
//!
//! A single FIFO queue drained by one tokio task. Ids are preloaded at most
//! once per process; each batch respects the confidence gate and the
//! inter-batch delay, and the task checks for shutdown between batches.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{watch, Notify};

use cortex_core::config::PreloaderConfig;
use cortex_core::memory::Confidence;
use cortex_core::traits::IMemoryStorage;

use crate::cache::EmbeddingCache;

/// Shared queue state.
struct QueueState {
    pending: VecDeque<String>,
    /// Every id ever enqueued this process — enforces at-most-once.
    seen: HashSet<String>,
}

/// Accepts predicted ids and feeds the drain task.
pub struct Preloader {
    config: PreloaderConfig,
    cache: Arc<EmbeddingCache>,
    storage: Arc<dyn IMemoryStorage>,
    state: Arc<Mutex<QueueState>>,
    wake: Arc<Notify>,
}

/// Owns the drain task; dropping the handle after `shutdown` stops preloading.
pub struct PreloaderHandle {
    task: tokio::task::JoinHandle<()>,
    stop_tx: watch::Sender<bool>,
    wake: Arc<Notify>,
}

impl PreloaderHandle {
    /// Signal the drain task and wait for it to finish its current batch.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        self.wake.notify_one();
        let _ = self.task.await;
    }
}

impl Preloader {
    pub fn new(
        config: PreloaderConfig,
        cache: Arc<EmbeddingCache>,
        storage: Arc<dyn IMemoryStorage>,
    ) -> Self {
        Self {
            config,
            cache,
            storage,
            state: Arc::new(Mutex::new(QueueState {
                pending: VecDeque::new(),
                seen: HashSet::new(),
            })),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Enqueue predicted memory ids. Ids already enqueued this process are
    /// ignored. Returns how many were accepted.
    pub fn enqueue(&self, ids: &[String]) -> usize {
        let mut state = self.state.lock().expect("preloader queue poisoned");
        let mut accepted = 0;
        for id in ids {
            if state.seen.insert(id.clone()) {
                state.pending.push_back(id.clone());
                accepted += 1;
            }
        }
        drop(state);
        if accepted > 0 {
            self.wake.notify_one();
        }
        accepted
    }

    /// Ids currently waiting.
    pub fn queue_len(&self) -> usize {
        self.state.lock().expect("preloader queue poisoned").pending.len()
    }

    /// Spawn the drain task on the current tokio runtime.
    pub fn spawn(self: Arc<Self>) -> PreloaderHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let wake = Arc::clone(&self.wake);
        let task = tokio::spawn(async move {
            self.drain_loop(stop_rx).await;
        });
        PreloaderHandle {
            task,
            stop_tx,
            wake,
        }
    }

    async fn drain_loop(&self, stop_rx: watch::Receiver<bool>) {
        loop {
            if *stop_rx.borrow() {
                return;
            }

            let batch = self.next_batch();
            if batch.is_empty() {
                // Nothing queued; sleep until new ids arrive or shutdown.
                tokio::select! {
                    _ = self.wake.notified() => continue,
                    _ = sleep_watching(&stop_rx) => return,
                }
            }

            self.preload_batch(&batch);

            // Yield between batches so foreground queries aren't starved.
            tokio::time::sleep(Duration::from_millis(self.config.batch_delay_ms)).await;
        }
    }

    fn next_batch(&self) -> Vec<String> {
        let mut state = self.state.lock().expect("preloader queue poisoned");
        let n = self.config.max_batch_size.min(state.pending.len());
        state.pending.drain(..n).collect()
    }

    /// Embed one batch. Per-id failures are logged and skipped.
    fn preload_batch(&self, ids: &[String]) {
        if ids.is_empty() || !self.cache.is_available() {
            return;
        }
        let min_confidence = Confidence::new(self.config.min_confidence);

        let memories = match self.storage.get_bulk(ids) {
            Ok(memories) => memories,
            Err(e) => {
                tracing::warn!(error = %e, "preload batch fetch failed");
                return;
            }
        };

        let eligible: Vec<_> = memories
            .into_iter()
            .filter(|m| !m.archived && m.confidence >= min_confidence)
            .collect();

        match self.cache.embed_batch(&eligible) {
            Ok(stored) => {
                tracing::debug!(requested = ids.len(), stored, "preloaded embeddings");
            }
            Err(e) => {
                tracing::warn!(error = %e, "preload batch embed failed");
            }
        }
    }
}

/// Wait until the stop flag flips. Resolves only on shutdown.
async fn sleep_watching(stop_rx: &watch::Receiver<bool>) {
    let mut rx = stop_rx.clone();
    loop {
        if *rx.borrow() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_storage::StorageEngine;
    use test_fixtures::{tribal, with_confidence, HashEmbedder};

    fn preloader(config: PreloaderConfig) -> (Arc<Preloader>, Arc<StorageEngine>) {
        let storage = Arc::new(StorageEngine::open_in_memory().unwrap());
        let cache = Arc::new(EmbeddingCache::new(
            Arc::new(HashEmbedder::default()),
            Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
        ));
        (
            Arc::new(Preloader::new(
                config,
                cache,
                Arc::clone(&storage) as Arc<dyn IMemoryStorage>,
            )),
            storage,
        )
    }

    #[test]
    fn enqueue_is_at_most_once_per_id() {
        let (preloader, _storage) = preloader(PreloaderConfig::default());
        let ids = vec!["mem_a".to_string(), "mem_b".to_string()];
        assert_eq!(preloader.enqueue(&ids), 2);
        assert_eq!(preloader.enqueue(&ids), 0);
        assert_eq!(preloader.queue_len(), 2);
    }

    #[test]
    fn batch_respects_confidence_gate() {
        let (preloader, storage) = preloader(PreloaderConfig::default());
        let confident = with_confidence(tribal("confident"), 0.9);
        let doubtful = with_confidence(tribal("doubtful"), 0.2);
        storage.create(&confident).unwrap();
        storage.create(&doubtful).unwrap();

        preloader.preload_batch(&[confident.id.clone(), doubtful.id.clone()]);

        assert!(storage
            .get_embedding(&confident.id, "hash-test")
            .unwrap()
            .is_some());
        assert!(storage
            .get_embedding(&doubtful.id, "hash-test")
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn drain_task_processes_queue_and_shuts_down() {
        let (preloader, storage) = preloader(PreloaderConfig {
            batch_delay_ms: 1,
            ..Default::default()
        });
        let memory = with_confidence(tribal("queued for preload"), 0.9);
        storage.create(&memory).unwrap();

        let handle = Arc::clone(&preloader).spawn();
        preloader.enqueue(&[memory.id.clone()]);

        // Give the drain task a few ticks to pick up the batch.
        for _ in 0..50 {
            if storage
                .get_embedding(&memory.id, "hash-test")
                .unwrap()
                .is_some()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(storage
            .get_embedding(&memory.id, "hash-test")
            .unwrap()
            .is_some());

        handle.shutdown().await;
    }
}
