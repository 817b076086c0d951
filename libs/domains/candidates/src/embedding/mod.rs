mod config;
mod openai;
mod provider;
mod tei;

use std::sync::Arc;

pub use config::{DEFAULT_EMBEDDING_BATCH_SIZE, EmbeddingConfig, EmbeddingProviderKind};
pub use openai::OpenAIProvider;
#[cfg(test)]
pub use provider::MockEmbeddingProvider;
pub use provider::EmbeddingProvider;
pub use tei::TeiProvider;

use crate::error::CandidateResult;

/// Build the provider selected by `config.provider`.
///
/// `dimension` is forwarded to OpenAI `text-embedding-3*` models, which can
/// shorten their output; other models must natively produce it.
pub fn build_provider(
    config: &EmbeddingConfig,
    dimension: u64,
) -> CandidateResult<Arc<dyn EmbeddingProvider>> {
    let provider: Arc<dyn EmbeddingProvider> = match config.provider {
        EmbeddingProviderKind::Tei => Arc::new(TeiProvider::new(config)?),
        EmbeddingProviderKind::OpenAI => {
            let provider = OpenAIProvider::new(config)?;
            if config.model.starts_with("text-embedding-3") {
                Arc::new(provider.with_dimensions(dimension))
            } else {
                Arc::new(provider)
            }
        }
    };

    tracing::info!(
        provider = provider.name(),
        url = %config.url,
        model = %config.model,
        "Embedding provider configured"
    );
    Ok(provider)
}
