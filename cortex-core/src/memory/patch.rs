//! Partial updates. `update(id, patch)` merges the set fields into the
//! stored record and leaves everything else untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity;

use super::base::{BaseMemory, TypedContent};
use super::confidence::Confidence;
use super::importance::Importance;
use super::links::{Citation, ConstraintLink, FunctionLink, PatternLink};

/// Fields of a memory that may be updated after creation.
/// `None` means "leave unchanged"; applying twice is idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryPatch {
    pub summary: Option<String>,
    pub content: Option<TypedContent>,
    pub confidence: Option<f64>,
    pub importance: Option<Importance>,
    pub tags: Option<Vec<String>>,
    pub valid_time: Option<DateTime<Utc>>,
    pub valid_until: Option<Option<DateTime<Utc>>>,
    pub linked_patterns: Option<Vec<PatternLink>>,
    pub linked_constraints: Option<Vec<ConstraintLink>>,
    pub linked_files: Option<Vec<Citation>>,
    pub linked_functions: Option<Vec<FunctionLink>>,
    pub supersedes: Option<Option<String>>,
    pub superseded_by: Option<Option<String>>,
    pub last_validated: Option<DateTime<Utc>>,
}

/// What changed when a patch was applied. Drives cache invalidation.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatchEffect {
    /// The summary text changed — any cached embedding is now stale.
    pub summary_changed: bool,
    /// The content payload changed — the content hash was recomputed.
    pub content_changed: bool,
}

impl MemoryPatch {
    /// A patch that only adjusts confidence.
    pub fn confidence(value: f64) -> Self {
        Self {
            confidence: Some(value),
            ..Self::default()
        }
    }

    /// A patch that only replaces the summary.
    pub fn summary(text: impl Into<String>) -> Self {
        Self {
            summary: Some(text.into()),
            ..Self::default()
        }
    }

    /// True when the patch carries no changes at all.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.content.is_none()
            && self.confidence.is_none()
            && self.importance.is_none()
            && self.tags.is_none()
            && self.valid_time.is_none()
            && self.valid_until.is_none()
            && self.linked_patterns.is_none()
            && self.linked_constraints.is_none()
            && self.linked_files.is_none()
            && self.linked_functions.is_none()
            && self.supersedes.is_none()
            && self.superseded_by.is_none()
            && self.last_validated.is_none()
    }

    /// Merge this patch into a memory. Bumps `updated_at`, re-clamps
    /// confidence, and recomputes the content hash when content changed.
    pub fn apply(&self, memory: &mut BaseMemory) -> PatchEffect {
        let mut effect = PatchEffect::default();

        if let Some(summary) = &self.summary {
            if *summary != memory.summary {
                memory.summary = summary.clone();
                effect.summary_changed = true;
            }
        }
        if let Some(content) = &self.content {
            let new_hash = BaseMemory::compute_content_hash(content);
            if new_hash != memory.content_hash {
                memory.content = content.clone();
                memory.memory_type = content.memory_type();
                memory.content_hash = new_hash;
                effect.content_changed = true;
            }
        }
        if let Some(confidence) = self.confidence {
            memory.confidence = Confidence::new(confidence);
        }
        if let Some(importance) = self.importance {
            memory.importance = importance;
        }
        if let Some(tags) = &self.tags {
            memory.tags = tags.clone();
        }
        if let Some(valid_time) = self.valid_time {
            memory.valid_time = valid_time;
        }
        if let Some(valid_until) = self.valid_until {
            memory.valid_until = valid_until;
        }
        if let Some(patterns) = &self.linked_patterns {
            memory.linked_patterns = patterns.clone();
        }
        if let Some(constraints) = &self.linked_constraints {
            memory.linked_constraints = constraints.clone();
        }
        if let Some(files) = &self.linked_files {
            memory.linked_files = files.clone();
        }
        if let Some(functions) = &self.linked_functions {
            memory.linked_functions = functions.clone();
        }
        if let Some(supersedes) = &self.supersedes {
            memory.supersedes = supersedes.clone();
        }
        if let Some(superseded_by) = &self.superseded_by {
            memory.superseded_by = superseded_by.clone();
        }
        if let Some(last_validated) = self.last_validated {
            memory.last_validated = Some(last_validated);
        }

        memory.updated_at = identity::monotonic_now();
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::TribalContent;

    fn tribal() -> BaseMemory {
        BaseMemory::new(
            TypedContent::Tribal(TribalContent {
                knowledge: "never deploy on fridays".to_string(),
                ..Default::default()
            }),
            "deploy freeze",
        )
        .unwrap()
    }

    #[test]
    fn apply_is_idempotent_modulo_updated_at() {
        let mut a = tribal();
        let mut b = a.clone();
        let patch = MemoryPatch {
            summary: Some("deploy freeze rule".to_string()),
            confidence: Some(0.7),
            ..Default::default()
        };
        patch.apply(&mut a);
        patch.apply(&mut a);
        patch.apply(&mut b);
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn confidence_is_reclamped() {
        let mut m = tribal();
        MemoryPatch::confidence(7.3).apply(&mut m);
        assert_eq!(m.confidence.value(), 1.0);
    }

    #[test]
    fn summary_change_is_flagged() {
        let mut m = tribal();
        let effect = MemoryPatch::summary("something new").apply(&mut m);
        assert!(effect.summary_changed);
        let effect = MemoryPatch::summary("something new").apply(&mut m);
        assert!(!effect.summary_changed);
    }
}
