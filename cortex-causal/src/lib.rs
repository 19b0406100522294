//! # cortex-causal
//!
//! The causal graph engine. Persists directed edges between memories,
//! infers new edges through pluggable strategies, and answers bounded
//! traversal and counterfactual queries.

pub mod graph;
pub mod inference;
pub mod traversal;

pub use graph::{CausalGraph, EdgeRequest};
pub use inference::{InferenceStrategy, InferredEdge};
pub use traversal::TraversalOptions;
