//! # cortex-decay
//!
//! Confidence is a perishable good. This crate applies per-type half-life
//! decay, archives what falls below the floor, and adjusts confidence from
//! downstream accept/modify/reject outcomes. A maintenance pass applies
//! feedback first, then decay.

pub mod engine;
pub mod feedback;
pub mod formula;

pub use engine::DecayEngine;
pub use feedback::FeedbackProcessor;
