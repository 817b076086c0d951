use domain_candidates::CandidatesApiDoc;
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::server::HealthResponse)
    ),
    info(
        title = "CV Search API",
        version = "0.1.0",
        description = "Semantic search over candidate résumés backed by a vector store"
    ),
    modifiers(&CandidateRoutes)
)]
pub struct ApiDoc;

/// Candidate routes are mounted at the root, so merge instead of nest.
struct CandidateRoutes;

impl Modify for CandidateRoutes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(CandidatesApiDoc::openapi());
    }
}
