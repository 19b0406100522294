use crate::errors::CortexResult;

/// An embedding provider. The engine never assumes one is present; when
/// unavailable, semantic search degrades to filter search.
pub trait IEmbeddingProvider: Send + Sync {
    /// Provider name, part of the embedding cache key.
    fn name(&self) -> &str;
    /// Output vector dimensionality.
    fn dimensions(&self) -> usize;
    /// Largest input the provider accepts, in tokens.
    fn max_tokens(&self) -> usize;
    /// Prepare the provider. Fails `ProviderUnavailable` when it cannot serve.
    fn initialize(&self) -> CortexResult<()>;
    fn embed(&self, text: &str) -> CortexResult<Vec<f32>>;
    fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>>;
    fn is_available(&self) -> bool;
}
