//! Level selection for a single memory and greedy budget packing for
//! batches.

use std::collections::BTreeMap;

use cortex_core::config::CompressionConfig;
use cortex_core::memory::BaseMemory;
use cortex_core::models::{CompressedMemory, CompressionLevel, CompressionResult};
use cortex_core::traits::ITokenEstimator;
use cortex_core::{CortexError, CortexResult};

use crate::context::{INeighborhoodSource, MemoryNeighborhood};
use crate::levels;

/// Options for one compression pass.
#[derive(Debug, Clone, Default)]
pub struct CompressOptions {
    pub config: CompressionConfig,
    /// Remaining budget, if the caller is packing into one.
    pub budget: Option<usize>,
}

/// Compress a single memory.
///
/// Selection: start at the target level; step down while the projection
/// exceeds the level's max tokens or the remaining budget; optionally
/// escalate one level when it fits; never leave `[min_level, max_level]`.
/// Fails `BudgetExceeded` when even the floor level cannot fit.
pub fn compress(
    memory: &BaseMemory,
    options: &CompressOptions,
    estimator: &dyn ITokenEstimator,
    context: &dyn INeighborhoodSource,
) -> CortexResult<CompressedMemory> {
    let config = &options.config;
    let budget = options.budget.unwrap_or(usize::MAX);
    let min_level = config.min_level;
    let max_level = config.max_level.max(min_level);
    let neighborhood = context.neighborhood(memory);

    let fits = |projection: &CompressedMemory, level: CompressionLevel| {
        projection.token_count() <= level.max_tokens() && projection.token_count() <= budget
    };

    let mut level = config.target_level.clamp(min_level, max_level);
    let mut projection = levels::project(memory, level, estimator, &neighborhood);

    while !fits(&projection, level) && level > min_level {
        level = level.step_down();
        projection = levels::project(memory, level, estimator, &neighborhood);
    }

    if !fits(&projection, level) {
        return Err(CortexError::BudgetExceeded {
            needed: projection.token_count(),
            remaining: budget.min(level.max_tokens()),
        });
    }

    if config.allow_escalation && level < max_level {
        let upper = level.step_up();
        let escalated = levels::project(memory, upper, estimator, &neighborhood);
        if fits(&escalated, upper) {
            return Ok(escalated);
        }
    }

    Ok(projection)
}

/// Pack a batch into a budget.
///
/// Items are taken by importance weight descending, then confidence
/// descending. Each is projected at the highest level that fits the
/// remaining budget; once the budget is tight, the rest ride along at L0.
/// Fails `BudgetExceeded` when an item cannot fit even at the floor.
pub fn compress_batch(
    memories: &[BaseMemory],
    budget: usize,
    config: &CompressionConfig,
    estimator: &dyn ITokenEstimator,
    context: &dyn INeighborhoodSource,
) -> CortexResult<CompressionResult> {
    let mut order: Vec<&BaseMemory> = memories.iter().collect();
    order.sort_by(|a, b| {
        b.importance
            .weight()
            .partial_cmp(&a.importance.weight())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.confidence
                    .value()
                    .partial_cmp(&a.confidence.value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    let mut remaining = budget;
    let mut compressed = Vec::with_capacity(order.len());
    let mut total_tokens = 0usize;
    let mut ratio_sum = 0.0f64;
    let mut level_breakdown: BTreeMap<u8, usize> = BTreeMap::new();

    for memory in order {
        let neighborhood = context.neighborhood(memory);
        let item = best_fit(memory, remaining, config, estimator, &neighborhood)?;
        let tokens = item.token_count();

        let full_tokens =
            levels::project(memory, CompressionLevel::L3, estimator, &neighborhood).token_count();
        if full_tokens > 0 {
            ratio_sum += tokens as f64 / full_tokens as f64;
        }

        remaining = remaining.saturating_sub(tokens);
        total_tokens += tokens;
        *level_breakdown.entry(item.level().as_u8()).or_insert(0) += 1;
        compressed.push(item);
    }

    let average_compression_ratio = if compressed.is_empty() {
        0.0
    } else {
        ratio_sum / compressed.len() as f64
    };

    tracing::debug!(
        items = compressed.len(),
        total_tokens,
        budget,
        "compressed batch"
    );

    Ok(CompressionResult {
        compressed,
        total_tokens,
        average_compression_ratio,
        level_breakdown,
    })
}

/// Highest level within config bounds whose projection fits both the level
/// ceiling and the remaining budget.
fn best_fit(
    memory: &BaseMemory,
    remaining: usize,
    config: &CompressionConfig,
    estimator: &dyn ITokenEstimator,
    neighborhood: &MemoryNeighborhood,
) -> CortexResult<CompressedMemory> {
    let min_level = config.min_level;
    let max_level = config.max_level.max(min_level);

    for level in CompressionLevel::ALL_DESC {
        if level > max_level || level < min_level {
            continue;
        }
        let projection = levels::project(memory, level, estimator, neighborhood);
        let tokens = projection.token_count();
        if tokens <= level.max_tokens() && tokens <= remaining {
            return Ok(projection);
        }
    }

    let floor = levels::project(memory, min_level, estimator, neighborhood);
    Err(CortexError::BudgetExceeded {
        needed: floor.token_count(),
        remaining,
    })
}
