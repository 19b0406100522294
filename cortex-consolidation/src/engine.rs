//! ConsolidationEngine — single-execution guard around the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cortex_causal::CausalGraph;
use cortex_core::config::ConsolidationConfig;
use cortex_core::errors::{ConsolidationError, CortexError, CortexResult};
use cortex_core::models::ConsolidationReport;
use cortex_core::traits::{IMemoryStorage, IRunStorage};

use crate::pipeline;

pub struct ConsolidationEngine {
    storage: Arc<dyn IMemoryStorage>,
    runs: Arc<dyn IRunStorage>,
    graph: Arc<CausalGraph>,
    config: ConsolidationConfig,
    /// Only one consolidation can run at a time.
    is_running: AtomicBool,
}

impl ConsolidationEngine {
    pub fn new(
        storage: Arc<dyn IMemoryStorage>,
        runs: Arc<dyn IRunStorage>,
        graph: Arc<CausalGraph>,
        config: ConsolidationConfig,
    ) -> Self {
        Self {
            storage,
            runs,
            graph,
            config,
            is_running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Run the pipeline once. Fails `AlreadyRunning` if a run is active.
    pub fn run(&self) -> CortexResult<ConsolidationReport> {
        self.run_with_cancel(&|| false)
    }

    /// Run with a cooperative cancellation check, consulted at every phase
    /// boundary.
    pub fn run_with_cancel(&self, cancelled: &dyn Fn() -> bool) -> CortexResult<ConsolidationReport> {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CortexError::ConsolidationError(
                ConsolidationError::AlreadyRunning,
            ));
        }

        let result = pipeline::run_pipeline(&self.storage, &self.graph, &self.config, cancelled);

        self.is_running.store(false, Ordering::SeqCst);

        let report = result?;
        if let Err(e) = self.runs.record_consolidation_run(&report) {
            tracing::warn!(run_id = %report.run_id, error = %e, "failed to persist run metrics");
        }
        Ok(report)
    }
}
