//! Candidate search domain
//!
//! Semantic search over candidate résumés: records are flattened into a
//! text blob, embedded, and stored as points in a vector collection keyed
//! by a UUID derived from `id_candidat`.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │  handlers::router │  ← API token check, query/body validation
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │ CandidateService  │  ← text blobs, embedding, domain defaults
//! └────┬─────────┬────┘
//!      │         │
//! ┌────▼──────────────────┐  ┌───▼───────────────┐
//! │ CandidateRepository   │  │ EmbeddingProvider │
//! │   (trait)             │  │   (trait)         │
//! └────┬──────────────────┘  └───┬───────────────┘
//!      │                         │
//! ┌────▼──────────────────┐  ┌───▼───────────────┐
//! │ QdrantRepository      │  │ TeiProvider       │
//! │ InMemoryCandidate...  │  │ OpenAIProvider    │
//! └───────────────────────┘  └───────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::FromEnv;
//! use domain_candidates::{
//!     CandidateConfig, CandidateService, EmbeddingConfig, QdrantConfig, QdrantRepository,
//!     build_provider, handlers,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CandidateConfig::from_env()?;
//! let embedder = build_provider(&EmbeddingConfig::from_env()?, config.vector_size)?;
//! let repository =
//!     QdrantRepository::new(&QdrantConfig::from_env()?, config.collection_name.clone())?;
//!
//! let service = CandidateService::new(repository, embedder, config);
//! let router = handlers::router(service);
//! # let _ = router;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod qdrant;
pub mod repository;
pub mod service;

pub use config::{
    CandidateConfig, DEFAULT_COLLECTION, DEFAULT_DOMAIN, DEFAULT_DOMAIN_FIELD,
    DEFAULT_VECTOR_SIZE, VectorStoreKind,
};
pub use embedding::{
    EmbeddingConfig, EmbeddingProvider, EmbeddingProviderKind, OpenAIProvider, TeiProvider,
    build_provider,
};
pub use error::{CandidateError, CandidateResult};
pub use handlers::ApiDoc as CandidatesApiDoc;
pub use memory::InMemoryCandidateRepository;
pub use models::*;
pub use qdrant::{DEFAULT_QDRANT_URL, QdrantConfig, QdrantRepository};
pub use repository::CandidateRepository;
pub use service::CandidateService;
