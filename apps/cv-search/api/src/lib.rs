//! CV search HTTP API
//!
//! Wires configuration, tracing, metrics, the embedding provider and the
//! selected vector store into one axum server.

pub mod api;
pub mod config;
pub mod openapi;

use axum::{Router, routing::get};
use axum_helpers::server::{create_production_app, create_router, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_candidates::{
    CandidateRepository, CandidateService, EmbeddingProvider, InMemoryCandidateRepository,
    QdrantRepository, VectorStoreKind, build_provider,
};
use observability::{init_metrics, metrics_handler, metrics_middleware};
use std::sync::Arc;
use tracing::{info, warn};

pub use config::Config;

/// Load configuration and serve until SIGINT/SIGTERM.
pub async fn run() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);
    init_metrics().map_err(|e| eyre::eyre!("Failed to install metrics recorder: {}", e))?;

    info!(config = ?config.candidates, "Loaded candidate configuration");

    let embedder = build_provider(&config.embedding, config.candidates.vector_size)?;

    match config.candidates.vector_store {
        VectorStoreKind::Qdrant => {
            info!("Connecting to Qdrant at {}", config.qdrant.url);
            let repository =
                QdrantRepository::new(&config.qdrant, config.candidates.collection_name.clone())?;
            serve(config, repository, embedder).await
        }
        VectorStoreKind::Memory => {
            warn!("VECTOR_STORE=memory: candidates live in process memory and are lost on restart");
            let repository = InMemoryCandidateRepository::new(
                config.candidates.collection_name.clone(),
                config.candidates.vector_size,
            );
            serve(config, repository, embedder).await
        }
    }
}

async fn serve<R: CandidateRepository + 'static>(
    config: Config,
    repository: R,
    embedder: Arc<dyn EmbeddingProvider>,
) -> eyre::Result<()> {
    let service = CandidateService::new(repository, embedder, config.candidates.clone())
        .with_embed_batch_size(config.embedding.batch_size);
    let app = build_app(&config, service)?;

    info!(
        "Starting CV search API with graceful shutdown ({:?} timeout)",
        config.server.shutdown_timeout()
    );

    create_production_app(app, &config.server, config.server.shutdown_timeout(), async {
        info!("Shutting down: no connections need explicit cleanup");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("CV search API shutdown complete");
    Ok(())
}

/// Full application router: candidate routes, docs, `/health`, `/ready`
/// and `/metrics`, all wrapped in the request-metrics middleware.
pub fn build_app<R: CandidateRepository + 'static>(
    config: &Config,
    service: CandidateService<R>,
) -> eyre::Result<Router> {
    let service = Arc::new(service);

    let router = create_router::<openapi::ApiDoc>(
        api::routes(Arc::clone(&service)),
        config.cors_allowed_origin.as_deref(),
    )?;

    Ok(router
        .merge(health_router(config.app))
        .merge(api::ready_router(service, config.ready_check_embedding))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn(metrics_middleware)))
}
