/// Retrieval pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("query produced no interpretable filters: {query}")]
    EmptyQuery { query: String },

    #[error("embedding failed for query: {reason}")]
    EmbeddingFailed { reason: String },

    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },
}
