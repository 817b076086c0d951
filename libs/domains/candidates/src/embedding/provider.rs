use async_trait::async_trait;

use crate::error::CandidateResult;

/// Trait for embedding generation providers
///
/// Implementations call an external model server; no inference happens in
/// process.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Short provider label for logs and metrics
    fn name(&self) -> &'static str;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> CandidateResult<Vec<f32>>;

    /// Generate embeddings for multiple texts in one call, in input order
    async fn embed_batch(&self, texts: &[String]) -> CandidateResult<Vec<Vec<f32>>>;

    /// Liveness of the model server
    async fn health_check(&self) -> CandidateResult<()> {
        self.embed("ping").await.map(|_| ())
    }
}
