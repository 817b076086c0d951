//! Candidate-domain metrics.

use metrics::{counter, histogram};

/// Candidate metrics recorder
pub struct CandidateMetrics;

impl CandidateMetrics {
    // =========================================================================
    // Search
    // =========================================================================

    /// Record a completed search. `filtered` is true when a domain filter
    /// was applied; the domain value itself is never a label.
    pub fn record_search(filtered: bool, hits: usize, duration_secs: f64) {
        let filter = search_filter_label(filtered);

        counter!("candidate_searches_total", "filter" => filter).increment(1);
        histogram!("candidate_search_duration_seconds", "filter" => filter)
            .record(duration_secs);
        histogram!("candidate_search_results").record(hits as f64);

        tracing::debug!(hits = hits, duration_secs = duration_secs, "Search recorded");
    }

    // =========================================================================
    // Writes
    // =========================================================================

    pub fn record_indexed(count: usize) {
        counter!("candidates_indexed_total").increment(count as u64);
    }

    pub fn record_deleted(count: usize) {
        counter!("candidates_deleted_total").increment(count as u64);
    }

    /// Record a failed operation. `kind` is a short error class such as
    /// `"embedding"` or `"store"`.
    pub fn record_error(operation: &'static str, kind: &'static str) {
        counter!(
            "candidate_operation_errors_total",
            "operation" => operation,
            "kind" => kind
        )
        .increment(1);
    }

    // =========================================================================
    // Embedding
    // =========================================================================

    pub fn record_embedding(provider: &str, texts: usize, duration_secs: f64) {
        counter!("embedding_texts_total", "provider" => provider.to_string())
            .increment(texts as u64);
        histogram!(
            "embedding_request_duration_seconds",
            "provider" => provider.to_string()
        )
        .record(duration_secs);
    }
}

fn search_filter_label(filtered: bool) -> &'static str {
    if filtered { "domain" } else { "all" }
}
