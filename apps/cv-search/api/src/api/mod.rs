use axum::Router;
use domain_candidates::{CandidateRepository, CandidateService, handlers};
use std::sync::Arc;

pub mod health;

/// Candidate routes, mounted at the root by `create_router`.
pub fn routes<R: CandidateRepository + 'static>(service: Arc<CandidateService<R>>) -> Router {
    handlers::shared_router(service)
}

/// Creates a router with the /ready endpoint that performs actual health checks.
///
/// This router has state applied and can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router<R: CandidateRepository + 'static>(
    service: Arc<CandidateService<R>>,
    check_embedding: bool,
) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler::<R>))
        .with_state(health::ReadyState {
            service,
            check_embedding,
        })
}
