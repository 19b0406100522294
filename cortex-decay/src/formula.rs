//! The decay formula: `c' = c · 0.5^(age / half_life)`.

use chrono::{DateTime, Utc};

use cortex_core::config::DecayConfig;
use cortex_core::memory::{half_life_days, BaseMemory};

/// Effective half-life for a memory, honoring config overrides.
/// `None` means the type never decays.
pub fn effective_half_life(memory: &BaseMemory, config: &DecayConfig) -> Option<f64> {
    if let Some(days) = config
        .half_life_overrides
        .get(memory.memory_type.as_str())
    {
        return Some(*days);
    }
    half_life_days(memory.memory_type)
}

/// Age in fractional days since the memory was last touched.
pub fn age_days(memory: &BaseMemory, now: DateTime<Utc>) -> f64 {
    let anchor = memory.last_accessed.max(memory.created_at);
    (now - anchor).num_seconds().max(0) as f64 / 86_400.0
}

/// Decayed confidence. Never higher than the input.
pub fn decayed_confidence(
    memory: &BaseMemory,
    config: &DecayConfig,
    now: DateTime<Utc>,
) -> f64 {
    let Some(half_life) = effective_half_life(memory, config) else {
        return memory.confidence.value();
    };
    let age = age_days(memory, now);
    memory.confidence.value() * 0.5f64.powf(age / half_life)
}
