use serde::{Deserialize, Serialize};

use super::defaults;

/// Consolidation subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Whether the background scheduler runs at all.
    pub enabled: bool,
    /// Minimum episode age before replay selects it (hours).
    pub min_age_hours: u64,
    /// Max episodes processed per run.
    pub max_episodes: usize,
    /// Scheduler interval (milliseconds).
    pub schedule_interval_ms: u64,
    /// A fact must recur this often within a group to survive abstraction.
    pub min_fact_frequency: usize,
    /// Minimum access count for the strengthening phase.
    pub strengthen_min_access: u64,
    /// Strengthening considers at most this many memories per run.
    pub strengthen_top_n: usize,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_age_hours: defaults::DEFAULT_MIN_AGE_HOURS,
            max_episodes: defaults::DEFAULT_MAX_EPISODES,
            schedule_interval_ms: defaults::DEFAULT_SCHEDULE_INTERVAL_MS,
            min_fact_frequency: defaults::DEFAULT_MIN_FACT_FREQUENCY,
            strengthen_min_access: defaults::DEFAULT_STRENGTHEN_MIN_ACCESS,
            strengthen_top_n: defaults::DEFAULT_STRENGTHEN_TOP_N,
        }
    }
}
