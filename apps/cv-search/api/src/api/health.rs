//! Readiness check against the vector store and, optionally, the embedder.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_helpers::server::{HealthCheckFuture, run_health_checks};
use domain_candidates::{CandidateRepository, CandidateService};
use std::sync::Arc;

pub struct ReadyState<R: CandidateRepository> {
    pub service: Arc<CandidateService<R>>,
    pub check_embedding: bool,
}

impl<R: CandidateRepository> Clone for ReadyState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            check_embedding: self.check_embedding,
        }
    }
}

/// Readiness check endpoint that pings the dependencies the API needs.
pub async fn ready_handler<R: CandidateRepository>(State(state): State<ReadyState<R>>) -> Response {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = vec![(
        "vector_store",
        Box::pin(async {
            state
                .service
                .store_health()
                .await
                .map_err(|e| format!("Vector store check failed: {}", e))
        }),
    )];

    if state.check_embedding {
        checks.push((
            "embedding",
            Box::pin(async {
                state
                    .service
                    .embedder_health()
                    .await
                    .map_err(|e| format!("Embedding check failed: {}", e))
            }),
        ));
    }

    match run_health_checks(checks).await {
        Ok((status, json)) => (status, json).into_response(),
        Err((status, json)) => (status, json).into_response(),
    }
}
