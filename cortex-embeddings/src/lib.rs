//! # cortex-embeddings
//!
//! Memoizes summary embeddings in two tiers — a moka in-memory cache keyed by
//! `{provider}:{summary hash}` and the persistent embeddings table — and runs
//! the cooperative background preloader that warms vectors for predicted ids.

pub mod cache;
pub mod preloader;

pub use cache::EmbeddingCache;
pub use preloader::{Preloader, PreloaderHandle};
