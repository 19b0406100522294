use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding preloader configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloaderConfig {
    /// Ids embedded per batch.
    pub max_batch_size: usize,
    /// Memories below this confidence are not preloaded.
    pub min_confidence: f64,
    /// Pause between batches (milliseconds) so foreground work isn't starved.
    pub batch_delay_ms: u64,
    /// Whether the background preload task runs at all.
    pub background_preload: bool,
}

impl Default for PreloaderConfig {
    fn default() -> Self {
        Self {
            max_batch_size: defaults::DEFAULT_PRELOAD_BATCH_SIZE,
            min_confidence: defaults::DEFAULT_PRELOAD_MIN_CONFIDENCE,
            batch_delay_ms: defaults::DEFAULT_PRELOAD_BATCH_DELAY_MS,
            background_preload: true,
        }
    }
}
