use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or_default, env_required};

pub const DEFAULT_COLLECTION: &str = "candidats";
pub const DEFAULT_DOMAIN_FIELD: &str = "domainemycv";
/// all-MiniLM-L6-v2 output size
pub const DEFAULT_VECTOR_SIZE: u64 = 384;

/// Domain tag stored when a record carries none
pub const DEFAULT_DOMAIN: &str = "autre";

/// Which vector store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorStoreKind {
    Qdrant,
    Memory,
}

impl std::str::FromStr for VectorStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "qdrant" => Ok(Self::Qdrant),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown vector store '{}', expected qdrant|memory", other)),
        }
    }
}

/// Settings of the candidate collection and its API.
#[derive(Clone)]
pub struct CandidateConfig {
    /// Shared secret every domain route requires
    pub api_token: String,
    pub collection_name: String,
    /// Payload key holding the domain tag, also used for filtering
    pub domain_field: String,
    pub vector_size: u64,
    pub vector_store: VectorStoreKind,
}

impl CandidateConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            collection_name: DEFAULT_COLLECTION.to_string(),
            domain_field: DEFAULT_DOMAIN_FIELD.to_string(),
            vector_size: DEFAULT_VECTOR_SIZE,
            vector_store: VectorStoreKind::Qdrant,
        }
    }

    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collection_name = name.into();
        self
    }

    pub fn with_domain_field(mut self, field: impl Into<String>) -> Self {
        self.domain_field = field.into();
        self
    }

    pub fn with_vector_size(mut self, size: u64) -> Self {
        self.vector_size = size;
        self
    }
}

impl std::fmt::Debug for CandidateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateConfig")
            .field("api_token", &"<redacted>")
            .field("collection_name", &self.collection_name)
            .field("domain_field", &self.domain_field)
            .field("vector_size", &self.vector_size)
            .field("vector_store", &self.vector_store)
            .finish()
    }
}

impl FromEnv for CandidateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_token = env_required("API_TOKEN")?;
        if api_token.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar("API_TOKEN".to_string()));
        }

        let vector_size = env_parse_or_default("CANDIDATE_VECTOR_SIZE", DEFAULT_VECTOR_SIZE)?;
        if vector_size == 0 {
            return Err(ConfigError::ParseError {
                key: "CANDIDATE_VECTOR_SIZE".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            api_token,
            collection_name: env_or_default("COLLECTION_NAME", DEFAULT_COLLECTION),
            domain_field: env_or_default("CANDIDATE_DOMAIN_FIELD", DEFAULT_DOMAIN_FIELD),
            vector_size,
            vector_store: env_parse_or_default("VECTOR_STORE", VectorStoreKind::Qdrant)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 5] = [
        "API_TOKEN",
        "COLLECTION_NAME",
        "CANDIDATE_DOMAIN_FIELD",
        "CANDIDATE_VECTOR_SIZE",
        "VECTOR_STORE",
    ];

    fn unset_all() -> Vec<(&'static str, Option<&'static str>)> {
        VARS.iter().map(|k| (*k, None)).collect()
    }

    #[test]
    fn test_defaults() {
        let mut vars = unset_all();
        vars[0] = ("API_TOKEN", Some("s3cret"));
        temp_env::with_vars(vars, || {
            let config = CandidateConfig::from_env().unwrap();
            assert_eq!(config.api_token, "s3cret");
            assert_eq!(config.collection_name, "candidats");
            assert_eq!(config.domain_field, "domainemycv");
            assert_eq!(config.vector_size, 384);
            assert_eq!(config.vector_store, VectorStoreKind::Qdrant);
        });
    }

    #[test]
    fn test_missing_token_is_an_error() {
        temp_env::with_vars(unset_all(), || {
            let err = CandidateConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("API_TOKEN"));
        });
    }

    #[test]
    fn test_blank_token_is_an_error() {
        temp_env::with_var("API_TOKEN", Some("   "), || {
            assert!(CandidateConfig::from_env().is_err());
        });
    }

    #[test]
    fn test_overrides() {
        temp_env::with_vars(
            [
                ("API_TOKEN", Some("t")),
                ("COLLECTION_NAME", Some("cv_test")),
                ("CANDIDATE_DOMAIN_FIELD", Some("domaine")),
                ("CANDIDATE_VECTOR_SIZE", Some("768")),
                ("VECTOR_STORE", Some("memory")),
            ],
            || {
                let config = CandidateConfig::from_env().unwrap();
                assert_eq!(config.collection_name, "cv_test");
                assert_eq!(config.domain_field, "domaine");
                assert_eq!(config.vector_size, 768);
                assert_eq!(config.vector_store, VectorStoreKind::Memory);
            },
        );
    }

    #[test]
    fn test_invalid_vector_store() {
        temp_env::with_vars(
            [("API_TOKEN", Some("t")), ("VECTOR_STORE", Some("pinecone"))],
            || {
                let err = CandidateConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("VECTOR_STORE"));
            },
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", CandidateConfig::new("s3cret"));
        assert!(!rendered.contains("s3cret"));
    }
}
