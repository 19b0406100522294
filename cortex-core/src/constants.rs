/// Cortex system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum traversal depth for causal graph queries.
pub const MAX_CAUSAL_TRAVERSAL_DEPTH: usize = 50;

/// Maximum batch size for bulk operations.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// Default compression level for new memories.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 2;

/// Default query result limit.
pub const DEFAULT_QUERY_LIMIT: usize = 100;

/// Hard cap on query result limits.
pub const MAX_QUERY_LIMIT: usize = 10_000;

/// Context lines included above/below a cited region when hashing it.
pub const CITATION_CONTEXT_LINES: u32 = 2;

/// Number of hex characters of the SHA-256 digest kept in a citation hash.
pub const CITATION_HASH_LEN: usize = 16;
