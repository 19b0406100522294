//! Background scheduler: runs consolidation on an interval for as long as
//! the handle lives. Shutdown is cooperative, checked between runs and at
//! phase boundaries inside a run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use cortex_core::CortexError;

use crate::engine::ConsolidationEngine;

/// Owns the scheduler task.
pub struct SchedulerHandle {
    task: tokio::task::JoinHandle<()>,
    stop_tx: watch::Sender<bool>,
}

impl SchedulerHandle {
    /// Spawn the interval task on the current tokio runtime.
    pub fn spawn(engine: Arc<ConsolidationEngine>, interval_ms: u64) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(engine, interval_ms, stop_rx));
        Self { task, stop_tx }
    }

    /// Signal shutdown and wait for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

async fn run_loop(
    engine: Arc<ConsolidationEngine>,
    interval_ms: u64,
    mut stop_rx: watch::Receiver<bool>,
) {
    let interval = Duration::from_millis(interval_ms.max(1));
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = stop_rx.changed() => {
                if *stop_rx.borrow() {
                    return;
                }
            }
        }
        if *stop_rx.borrow() {
            return;
        }

        // The engine holds the writer per phase; run it off the async
        // executor so foreground queries keep flowing.
        let engine_for_run = Arc::clone(&engine);
        let cancel_rx = stop_rx.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            engine_for_run.run_with_cancel(&|| *cancel_rx.borrow())
        })
        .await;

        match outcome {
            Ok(Ok(report)) => {
                tracing::debug!(run_id = %report.run_id, "scheduled consolidation finished");
            }
            Ok(Err(CortexError::Cancelled { .. })) => return,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "scheduled consolidation failed");
            }
            Err(e) => {
                tracing::error!(error = %e, "consolidation task panicked");
            }
        }
    }
}
