use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or_default};

/// gRPC endpoint of a local Qdrant
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Qdrant connection configuration
#[derive(Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl QdrantConfig {
    pub fn new(url: String) -> Self {
        Self {
            url,
            api_key: None,
            timeout_secs: 30,
        }
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl std::fmt::Debug for QdrantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FromEnv for QdrantConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_or_default("QDRANT_URL", DEFAULT_QDRANT_URL),
            api_key: env_optional("QDRANT_API_KEY"),
            timeout_secs: env_parse_or_default("QDRANT_TIMEOUT_SECS", 30u64)?,
        })
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self::new(DEFAULT_QDRANT_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", None::<&str>),
                ("QDRANT_API_KEY", None),
                ("QDRANT_TIMEOUT_SECS", None),
            ],
            || {
                let config = QdrantConfig::from_env().unwrap();
                assert_eq!(config.url, DEFAULT_QDRANT_URL);
                assert!(config.api_key.is_none());
                assert_eq!(config.timeout_secs, 30);
            },
        );
    }

    #[test]
    fn test_blank_api_key_is_none() {
        temp_env::with_var("QDRANT_API_KEY", Some(""), || {
            assert!(QdrantConfig::from_env().unwrap().api_key.is_none());
        });
    }

    #[test]
    fn test_bad_timeout() {
        temp_env::with_var("QDRANT_TIMEOUT_SECS", Some("soon"), || {
            assert!(QdrantConfig::from_env().is_err());
        });
    }
}
