use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CortexError, CortexResult};
use crate::identity::{self, MemoryId};

use super::confidence::Confidence;
use super::importance::Importance;
use super::links::{Citation, ConstraintLink, FunctionLink, PatternLink};
use super::types::{self, MemoryType};

/// Typed content wrapper — each memory type has its own content struct.
/// Serialized as a tagged enum so the type is preserved in JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum TypedContent {
    Core(types::CoreContent),
    Tribal(types::TribalContent),
    Procedural(types::ProceduralContent),
    Semantic(types::SemanticContent),
    Episodic(types::EpisodicContent),
    PatternRationale(types::PatternRationaleContent),
    ConstraintOverride(types::ConstraintOverrideContent),
    DecisionContext(types::DecisionContextContent),
    CodeSmell(types::CodeSmellContent),
}

impl TypedContent {
    /// The memory type this content belongs to.
    pub fn memory_type(&self) -> MemoryType {
        match self {
            Self::Core(_) => MemoryType::Core,
            Self::Tribal(_) => MemoryType::Tribal,
            Self::Procedural(_) => MemoryType::Procedural,
            Self::Semantic(_) => MemoryType::Semantic,
            Self::Episodic(_) => MemoryType::Episodic,
            Self::PatternRationale(_) => MemoryType::PatternRationale,
            Self::ConstraintOverride(_) => MemoryType::ConstraintOverride,
            Self::DecisionContext(_) => MemoryType::DecisionContext,
            Self::CodeSmell(_) => MemoryType::CodeSmell,
        }
    }

    /// Check that the required per-type fields are present.
    pub fn validate(&self) -> CortexResult<()> {
        let missing = |field: &str| CortexError::InvalidMemory {
            reason: format!("{} memory requires {field}", self.memory_type()),
        };
        match self {
            Self::Core(c) if c.project_name.is_empty() => Err(missing("project_name")),
            Self::Tribal(c) if c.knowledge.is_empty() => Err(missing("knowledge")),
            Self::Procedural(c) if c.steps.is_empty() => Err(missing("steps")),
            Self::Semantic(c) if c.knowledge.is_empty() => Err(missing("knowledge")),
            Self::Episodic(c) if c.interaction.is_empty() => Err(missing("interaction")),
            Self::PatternRationale(c) if c.pattern_id.is_empty() => Err(missing("pattern_id")),
            Self::PatternRationale(c) if c.rationale.is_empty() => Err(missing("rationale")),
            Self::ConstraintOverride(c) if c.constraint_id.is_empty() => {
                Err(missing("constraint_id"))
            }
            Self::DecisionContext(c) if c.decision.is_empty() => Err(missing("decision")),
            Self::CodeSmell(c) if c.smell.is_empty() => Err(missing("smell")),
            _ => Ok(()),
        }
    }
}

/// The universal memory record. Exclusively owned by the store; callers
/// receive clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseMemory {
    /// Unique, immutable identifier.
    pub id: MemoryId,
    /// The type of this memory.
    pub memory_type: MemoryType,
    /// Typed content — per-type struct, NOT a JSON blob.
    pub content: TypedContent,
    /// ~20 token summary for L0/L1 compression and embedding.
    pub summary: String,
    /// When the system learned this (bitemporal: transaction time).
    pub transaction_time: DateTime<Utc>,
    /// When this was/is true (bitemporal: valid time, interval start).
    pub valid_time: DateTime<Utc>,
    /// End of the validity interval; `None` means still valid.
    pub valid_until: Option<DateTime<Utc>>,
    /// Confidence score, decays over time.
    pub confidence: Confidence,
    /// Importance level.
    pub importance: Importance,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last time this memory was accessed. Never before `created_at`.
    pub last_accessed: DateTime<Utc>,
    /// Last time validation ran against this memory.
    pub last_validated: Option<DateTime<Utc>>,
    /// Number of times accessed.
    pub access_count: u64,
    pub created_by: Option<String>,
    /// Linked code patterns.
    pub linked_patterns: Vec<PatternLink>,
    /// Linked constraints.
    pub linked_constraints: Vec<ConstraintLink>,
    /// Linked files with citation info.
    pub linked_files: Vec<Citation>,
    /// Linked functions.
    pub linked_functions: Vec<FunctionLink>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Whether this memory has been archived (soft delete).
    pub archived: bool,
    pub archive_reason: Option<String>,
    /// ID of the memory that supersedes this one.
    pub superseded_by: Option<MemoryId>,
    /// ID of the memory this one supersedes.
    pub supersedes: Option<MemoryId>,
    /// blake3 hash of content for dedup and embedding cache invalidation.
    pub content_hash: String,
}

impl BaseMemory {
    /// Create a new memory with a fresh id and timestamps. The content is
    /// validated for the required per-type fields.
    pub fn new(content: TypedContent, summary: impl Into<String>) -> CortexResult<Self> {
        content.validate()?;
        let summary = summary.into();
        if summary.trim().is_empty() {
            return Err(CortexError::InvalidMemory {
                reason: "summary must not be empty".to_string(),
            });
        }
        let now = identity::monotonic_now();
        let content_hash = Self::compute_content_hash(&content);
        Ok(Self {
            id: identity::new_memory_id(),
            memory_type: content.memory_type(),
            content,
            summary,
            transaction_time: now,
            valid_time: now,
            valid_until: None,
            confidence: Confidence::default(),
            importance: Importance::Normal,
            created_at: now,
            updated_at: now,
            last_accessed: now,
            last_validated: None,
            access_count: 0,
            created_by: None,
            linked_patterns: Vec::new(),
            linked_constraints: Vec::new(),
            linked_files: Vec::new(),
            linked_functions: Vec::new(),
            tags: Vec::new(),
            archived: false,
            archive_reason: None,
            superseded_by: None,
            supersedes: None,
            content_hash,
        })
    }

    /// Compute the blake3 content hash from the serialized content.
    pub fn compute_content_hash(content: &TypedContent) -> String {
        let serialized = serde_json::to_string(content).unwrap_or_default();
        blake3::hash(serialized.as_bytes()).to_hex().to_string()
    }

    /// Check the record-level invariants that must hold at rest.
    pub fn check_invariants(&self) -> CortexResult<()> {
        if self.memory_type != self.content.memory_type() {
            return Err(CortexError::IntegrityViolation {
                reason: format!(
                    "memory {} declares type {} but carries {} content",
                    self.id,
                    self.memory_type,
                    self.content.memory_type()
                ),
            });
        }
        if let Some(until) = self.valid_until {
            if until < self.valid_time {
                return Err(CortexError::IntegrityViolation {
                    reason: format!("memory {}: valid_until precedes valid_time", self.id),
                });
            }
        }
        if self.last_accessed < self.created_at {
            return Err(CortexError::IntegrityViolation {
                reason: format!("memory {}: last_accessed precedes created_at", self.id),
            });
        }
        if self.supersedes.as_deref() == Some(self.id.as_str())
            || self.superseded_by.as_deref() == Some(self.id.as_str())
        {
            return Err(CortexError::IntegrityViolation {
                reason: format!("memory {} supersedes itself", self.id),
            });
        }
        Ok(())
    }

    /// Record an access: bump the counter and the timestamp.
    pub fn record_access(&mut self) {
        self.access_count += 1;
        self.last_accessed = identity::monotonic_now();
    }
}

impl PartialEq for BaseMemory {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
