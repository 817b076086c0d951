use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{EmbeddingConfig, EmbeddingProvider};
use crate::error::{CandidateError, CandidateResult};

/// HuggingFace text-embeddings-inference client (`POST {url}/embed`).
pub struct TeiProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    truncate: bool,
}

impl TeiProvider {
    pub fn new(config: &EmbeddingConfig) -> CandidateResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CandidateError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for TeiProvider {
    fn name(&self) -> &'static str {
        "tei"
    }

    async fn embed(&self, text: &str) -> CandidateResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CandidateError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> CandidateResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let response = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest {
                inputs: texts,
                truncate: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CandidateError::Embedding(format!(
                "TEI error ({}): {}",
                status, error_text
            )));
        }

        let vectors: Vec<Vec<f32>> = response.json().await?;
        if vectors.len() != texts.len() {
            return Err(CandidateError::Embedding(format!(
                "TEI returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }

        Ok(vectors)
    }

    async fn health_check(&self) -> CandidateResult<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CandidateError::Embedding(format!(
                "TEI health returned {}",
                response.status()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let inputs = vec!["a".to_string(), "b".to_string()];
        let body = serde_json::to_value(EmbedRequest {
            inputs: &inputs,
            truncate: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"inputs": ["a", "b"], "truncate": true}));
    }

    #[test]
    fn test_base_url_normalized() {
        let provider = TeiProvider::new(&EmbeddingConfig::tei("http://tei:80/")).unwrap();
        assert_eq!(provider.base_url, "http://tei:80");
        assert_eq!(provider.name(), "tei");
    }

    #[tokio::test]
    async fn test_empty_batch_skips_network() {
        // port 9 (discard) is never contacted for an empty batch
        let provider = TeiProvider::new(&EmbeddingConfig::tei("http://127.0.0.1:9")).unwrap();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }
}
