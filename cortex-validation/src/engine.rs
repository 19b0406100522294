//! ValidationEngine — runs every dimension over a memory and coordinates
//! healing.

use std::path::PathBuf;
use std::sync::Arc;

use cortex_core::errors::CortexResult;
use cortex_core::identity;
use cortex_core::memory::BaseMemory;
use cortex_core::models::{HealingOutcome, ValidationReport};
use cortex_core::traits::{ICausalStorage, IMemoryStorage, IPatternResolver};

use crate::dimensions;
use crate::healing;

pub struct ValidationEngine {
    /// Project root that citation paths are relative to.
    root: PathBuf,
    storage: Arc<dyn IMemoryStorage>,
    edges: Arc<dyn ICausalStorage>,
    resolver: Arc<dyn IPatternResolver>,
}

impl ValidationEngine {
    pub fn new(
        root: PathBuf,
        storage: Arc<dyn IMemoryStorage>,
        edges: Arc<dyn ICausalStorage>,
        resolver: Arc<dyn IPatternResolver>,
    ) -> Self {
        Self {
            root,
            storage,
            edges,
            resolver,
        }
    }

    /// Run all validators. Per-dimension failures are logged and the rest
    /// still run.
    pub fn validate(&self, memory: &BaseMemory) -> ValidationReport {
        let now = identity::monotonic_now();
        let mut issues = Vec::new();

        issues.extend(dimensions::citation::validate(&self.root, memory));
        issues.extend(dimensions::temporal::validate(memory, now));
        match dimensions::contradiction::validate(self.edges.as_ref(), memory) {
            Ok(found) => issues.extend(found),
            Err(e) => {
                tracing::warn!(memory_id = %memory.id, error = %e, "contradiction check failed");
            }
        }
        issues.extend(dimensions::pattern::validate(self.resolver.as_ref(), memory));

        ValidationReport {
            memory_id: memory.id.clone(),
            validated_at: now,
            issues,
        }
    }

    /// Heal what the report allows, persisting repairs through the store.
    pub fn heal(
        &self,
        memory: &BaseMemory,
        report: &ValidationReport,
    ) -> CortexResult<HealingOutcome> {
        healing::heal(&self.root, self.storage.as_ref(), memory, report)
    }

    /// Validate-and-heal in one pass, the shape the maintenance loop uses.
    pub fn validate_and_heal(
        &self,
        memory: &BaseMemory,
    ) -> CortexResult<(ValidationReport, Option<HealingOutcome>)> {
        let report = self.validate(memory);
        if report.is_healthy() {
            return Ok((report, None));
        }
        let outcome = self.heal(memory, &report)?;
        Ok((report, Some(outcome)))
    }
}
