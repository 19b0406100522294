//! # cortex-validation
//!
//! Keeps memories honest: recomputes citation hashes against live source,
//! flags temporal staleness and dormancy, surfaces active contradictions,
//! and heals what can be healed automatically.

pub mod citation_hash;
pub mod dimensions;
pub mod engine;
pub mod healing;

pub use engine::ValidationEngine;
