use core_config::{AppInfo, FromEnv, app_info, env_optional, env_parse_or_default, server::ServerConfig};
use domain_candidates::{CandidateConfig, EmbeddingConfig, QdrantConfig};

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application configuration
/// Composes shared config components and the candidate domain settings
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub candidates: CandidateConfig,
    pub qdrant: QdrantConfig,
    pub embedding: EmbeddingConfig,
    /// Comma-separated origins; unset leaves CORS off
    pub cors_allowed_origin: Option<String>,
    /// Include the embedding server in `/ready`
    pub ready_check_embedding: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let candidates = CandidateConfig::from_env()?; // API_TOKEN is required
        let qdrant = QdrantConfig::from_env()?;
        let embedding = EmbeddingConfig::from_env()?;
        let ready_check_embedding = env_parse_or_default("READY_CHECK_EMBEDDING", false)?;

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            candidates,
            qdrant,
            embedding,
            cors_allowed_origin: env_optional("CORS_ALLOWED_ORIGIN"),
            ready_check_embedding,
        })
    }
}
