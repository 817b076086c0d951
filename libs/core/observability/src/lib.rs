//! Observability utilities for the CV search service.
//!
//! This crate provides:
//! - Prometheus metrics recording and export
//! - Candidate search, indexing and embedding metrics
//! - Axum middleware for automatic request metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, CandidateMetrics};
//!
//! init_metrics()?;
//!
//! CandidateMetrics::record_search(true, 7, 0.042);
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler));
//! ```

pub mod candidates;
pub mod middleware;

pub use candidates::CandidateMetrics;
pub use middleware::metrics_middleware;

pub use metrics::{counter, gauge, histogram};
pub use metrics_exporter_prometheus::BuildError;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Initialize the Prometheus metrics recorder.
///
/// Call once at startup; later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

/// Get the metrics handle (must call init_metrics first)
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::describe_counter;
    use metrics::describe_histogram;

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // Candidate metrics
    describe_counter!(
        "candidate_searches_total",
        "Semantic searches by domain filter"
    );
    describe_histogram!(
        "candidate_search_duration_seconds",
        "End-to-end search duration (embedding plus vector query)"
    );
    describe_histogram!(
        "candidate_search_results",
        "Number of hits returned per search"
    );
    describe_counter!("candidates_indexed_total", "Candidates upserted");
    describe_counter!("candidates_deleted_total", "Candidate ids deleted");
    describe_counter!(
        "candidate_operation_errors_total",
        "Failed candidate operations by operation and kind"
    );

    // Embedding metrics
    describe_histogram!(
        "embedding_request_duration_seconds",
        "Embedding provider call duration"
    );
    describe_counter!("embedding_texts_total", "Texts sent for embedding");
}
