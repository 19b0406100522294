//! Engine configuration. Every knob has a named default and every struct is
//! `#[serde(default)]` so partial TOML files work.

mod causal_config;
mod compression_config;
mod consolidation_config;
mod decay_config;
mod preloader_config;
mod session_config;

pub use causal_config::CausalConfig;
pub use compression_config::CompressionConfig;
pub use consolidation_config::ConsolidationConfig;
pub use decay_config::DecayConfig;
pub use preloader_config::PreloaderConfig;
pub use session_config::SessionConfig;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CortexError, CortexResult};

/// Named defaults shared by the sub-configs.
pub mod defaults {
    // Decay
    pub const DEFAULT_ARCHIVAL_THRESHOLD: f64 = 0.15;

    // Consolidation
    pub const DEFAULT_MIN_AGE_HOURS: u64 = 24;
    pub const DEFAULT_MAX_EPISODES: usize = 100;
    pub const DEFAULT_SCHEDULE_INTERVAL_MS: u64 = 6 * 60 * 60 * 1000;
    pub const DEFAULT_MIN_FACT_FREQUENCY: usize = 2;
    pub const DEFAULT_STRENGTHEN_MIN_ACCESS: u64 = 5;
    pub const DEFAULT_STRENGTHEN_TOP_N: usize = 50;

    // Sessions
    pub const DEFAULT_MAX_DURATION_HOURS: u64 = 24;
    pub const DEFAULT_INACTIVITY_TIMEOUT_MINUTES: u64 = 30;
    pub const DEFAULT_MAX_TOKENS_PER_SESSION: usize = 1_000_000;
    pub const DEFAULT_RETENTION_DAYS: u64 = 7;

    // Preloader
    pub const DEFAULT_PRELOAD_BATCH_SIZE: usize = 10;
    pub const DEFAULT_PRELOAD_MIN_CONFIDENCE: f64 = 0.5;
    pub const DEFAULT_PRELOAD_BATCH_DELAY_MS: u64 = 100;

    // Causal inference
    pub const DEFAULT_MAX_TIME_DIFFERENCE_MS: i64 = 24 * 60 * 60 * 1000;
    pub const DEFAULT_HIGH_CONFIDENCE_WINDOW_MS: i64 = 60 * 60 * 1000;
    pub const DEFAULT_TEMPORAL_BASE_CONFIDENCE: f64 = 0.4;
    pub const DEFAULT_INFERENCE_MIN_CONFIDENCE: f64 = 0.2;
    pub const DEFAULT_SEMANTIC_SIMILARITY_THRESHOLD: f64 = 0.75;
    pub const DEFAULT_ENTITY_OVERLAP_THRESHOLD: f64 = 0.3;

    // Traversal
    pub const DEFAULT_TRAVERSAL_MAX_DEPTH: usize = 5;
    pub const DEFAULT_TRAVERSAL_MAX_NODES: usize = 200;

    // Thresholds
    pub const DEFAULT_DOMINANT_MIN_FREQUENCY: usize = 3;
    pub const DEFAULT_HEALTH_SCORE_WARNING: f64 = 0.6;
    pub const DEFAULT_HEALTH_SCORE_CRITICAL: f64 = 0.3;
}

/// Health and frequency thresholds surfaced to hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub dominant_min_frequency: usize,
    pub health_score_warning: f64,
    pub health_score_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            dominant_min_frequency: defaults::DEFAULT_DOMINANT_MIN_FREQUENCY,
            health_score_warning: defaults::DEFAULT_HEALTH_SCORE_WARNING,
            health_score_critical: defaults::DEFAULT_HEALTH_SCORE_CRITICAL,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CortexConfig {
    /// Database file path. `None` opens an in-memory store.
    pub db_path: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub session: SessionConfig,
    pub consolidation: ConsolidationConfig,
    pub decay: DecayConfig,
    pub preloader: PreloaderConfig,
    pub compression: CompressionConfig,
    pub causal: CausalConfig,
}

impl CortexConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> CortexResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| CortexError::Configuration {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        toml::from_str(&raw).map_err(|e| CortexError::Configuration {
            reason: format!("cannot parse {}: {e}", path.display()),
        })
    }

    /// Configuration for an in-memory engine (tests, ephemeral hosts).
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Configuration backed by a database file.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = CortexConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: CortexConfig = toml::from_str(&text).unwrap();
        assert_eq!(
            parsed.consolidation.max_episodes,
            config.consolidation.max_episodes
        );
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let parsed: CortexConfig = toml::from_str("[decay]\narchival_threshold = 0.2\n").unwrap();
        assert_eq!(parsed.decay.archival_threshold, 0.2);
        assert_eq!(
            parsed.session.max_tokens_per_session,
            defaults::DEFAULT_MAX_TOKENS_PER_SESSION
        );
    }
}
