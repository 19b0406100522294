//! The five phases, run in order. A phase failure is recorded against the
//! run and later phases still execute.

pub mod phase1_replay;
pub mod phase2_abstraction;
pub mod phase3_integration;
pub mod phase4_pruning;
pub mod phase5_strengthening;

use std::sync::Arc;

use cortex_causal::CausalGraph;
use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::CortexResult;
use cortex_core::identity;
use cortex_core::models::{ConsolidationReport, PhaseFailure};
use cortex_core::traits::IMemoryStorage;
use cortex_core::CortexError;

/// Cooperative cancellation, checked at every phase boundary.
pub type CancelCheck<'a> = &'a dyn Fn() -> bool;

/// Run the whole pipeline once.
pub fn run_pipeline(
    storage: &Arc<dyn IMemoryStorage>,
    graph: &CausalGraph,
    config: &ConsolidationConfig,
    cancelled: CancelCheck<'_>,
) -> CortexResult<ConsolidationReport> {
    let run_id = identity::new_run_id();
    let started_at = identity::monotonic_now();
    let mut failures: Vec<PhaseFailure> = Vec::new();

    let check = |phase: &str| -> CortexResult<()> {
        if cancelled() {
            Err(CortexError::Cancelled {
                operation: format!("consolidation:{phase}"),
            })
        } else {
            Ok(())
        }
    };

    // Phase 1: replay.
    check("replay")?;
    let episodes = match phase1_replay::select(storage.as_ref(), config) {
        Ok(episodes) => episodes,
        Err(e) => {
            failures.push(PhaseFailure {
                phase: "replay".to_string(),
                error: e.to_string(),
            });
            Vec::new()
        }
    };
    let processed = episodes.len();

    // Phase 2: abstraction.
    check("abstraction")?;
    let facts = phase2_abstraction::abstract_facts(&episodes, config);
    let abstracted = facts.len();

    // Phase 3: integration.
    check("integration")?;
    let integration = match phase3_integration::integrate(storage.as_ref(), graph, &facts) {
        Ok(outcome) => outcome,
        Err(e) => {
            failures.push(PhaseFailure {
                phase: "integration".to_string(),
                error: e.to_string(),
            });
            phase3_integration::IntegrationOutcome::default()
        }
    };

    // Phase 4: pruning.
    check("pruning")?;
    let pruned = match phase4_pruning::prune(storage.as_ref(), &integration.integrated_episodes) {
        Ok(count) => count,
        Err(e) => {
            failures.push(PhaseFailure {
                phase: "pruning".to_string(),
                error: e.to_string(),
            });
            0
        }
    };

    // Phase 5: strengthening.
    check("strengthening")?;
    let strengthened = match phase5_strengthening::strengthen(storage.as_ref(), config) {
        Ok(count) => count,
        Err(e) => {
            failures.push(PhaseFailure {
                phase: "strengthening".to_string(),
                error: e.to_string(),
            });
            0
        }
    };

    let report = ConsolidationReport {
        run_id,
        started_at,
        ended_at: identity::monotonic_now(),
        processed,
        abstracted,
        integrated: integration.integrated_count,
        pruned,
        strengthened,
        failures,
    };
    tracing::info!(
        run_id = %report.run_id,
        processed,
        abstracted,
        integrated = report.integrated,
        pruned,
        strengthened,
        "consolidation run complete"
    );
    Ok(report)
}
