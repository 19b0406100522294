/// Deterministic token estimation. Compression and budgeting depend on the
/// same input always producing the same count.
pub trait ITokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;

    /// Estimate a batch. Default implementation maps `estimate`.
    fn estimate_batch(&self, texts: &[String]) -> Vec<usize> {
        texts.iter().map(|t| self.estimate(t)).collect()
    }
}
