pub mod base;
pub mod confidence;
pub mod half_lives;
pub mod importance;
pub mod links;
pub mod patch;
pub mod query;
pub mod relationships;
pub mod types;

pub use base::{BaseMemory, TypedContent};
pub use confidence::Confidence;
pub use half_lives::{half_life_days, staleness_threshold_days};
pub use importance::Importance;
pub use links::{Citation, ConstraintLink, FunctionLink, PatternLink};
pub use patch::{MemoryPatch, PatchEffect};
pub use query::{MemoryQuery, OrderBy, OrderDir};
pub use relationships::{RelationshipEdge, RelationshipType};
pub use types::{ConsolidationStatus, MemoryType};
