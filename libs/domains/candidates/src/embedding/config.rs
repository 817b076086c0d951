use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or_default};

pub const DEFAULT_TEI_URL: &str = "http://localhost:8081";
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
/// TEI's default `--max-client-batch-size`
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProviderKind {
    /// HuggingFace text-embeddings-inference
    Tei,
    /// Any OpenAI-compatible `/embeddings` endpoint
    OpenAI,
}

impl std::str::FromStr for EmbeddingProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tei" => Ok(Self::Tei),
            "openai" => Ok(Self::OpenAI),
            other => Err(format!("unknown embedding provider '{}', expected tei|openai", other)),
        }
    }
}

/// Embedding model server settings.
#[derive(Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProviderKind,
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Most texts sent in one provider request
    pub batch_size: usize,
}

impl EmbeddingConfig {
    pub fn tei(url: impl Into<String>) -> Self {
        Self {
            provider: EmbeddingProviderKind::Tei,
            url: url.into(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: 30,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: EmbeddingProviderKind::OpenAI,
            url: DEFAULT_OPENAI_URL.to_string(),
            model: model.into(),
            api_key: Some(api_key.into()),
            timeout_secs: 30,
            batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl FromEnv for EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let provider = env_parse_or_default("EMBEDDING_PROVIDER", EmbeddingProviderKind::Tei)?;
        let default_url = match provider {
            EmbeddingProviderKind::Tei => DEFAULT_TEI_URL,
            EmbeddingProviderKind::OpenAI => DEFAULT_OPENAI_URL,
        };

        let api_key = env_optional("EMBEDDING_API_KEY");
        if provider == EmbeddingProviderKind::OpenAI && api_key.is_none() {
            return Err(ConfigError::MissingEnvVar("EMBEDDING_API_KEY".to_string()));
        }

        let batch_size =
            env_parse_or_default("EMBEDDING_BATCH_SIZE", DEFAULT_EMBEDDING_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::ParseError {
                key: "EMBEDDING_BATCH_SIZE".to_string(),
                details: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            provider,
            url: env_or_default("EMBEDDING_URL", default_url)
                .trim_end_matches('/')
                .to_string(),
            model: env_or_default("EMBEDDING_MODEL", DEFAULT_MODEL),
            api_key,
            timeout_secs: env_parse_or_default("EMBEDDING_TIMEOUT_SECS", 30u64)?,
            batch_size,
        })
    }
}
