use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CandidateResult;
use crate::models::{CandidatePoint, CollectionInfo, DomainFilter, ScoredCandidate, ScrollPage};

/// Repository trait for the candidate collection
///
/// An implementation is bound to one collection at construction; every
/// method operates on it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    // ===== Collection Management =====

    /// Drop the collection if present, then create it empty with cosine
    /// distance and the given vector size
    async fn recreate_collection(&self, dimension: u64) -> CandidateResult<()>;

    /// Create a keyword payload index on `field`
    async fn create_domain_index(&self, field: &str) -> CandidateResult<()>;

    /// `None` when the collection does not exist
    async fn collection_info(&self) -> CandidateResult<Option<CollectionInfo>>;

    // ===== Point Operations =====

    /// Insert or replace points, returning once the write is applied
    async fn upsert(&self, points: Vec<CandidatePoint>) -> CandidateResult<()>;

    /// Nearest neighbours by cosine similarity, best first, with payload
    async fn search(
        &self,
        vector: Vec<f32>,
        filter: Option<DomainFilter>,
        limit: u64,
    ) -> CandidateResult<Vec<ScoredCandidate>>;

    /// One page of points in id order, payload only
    async fn scroll(&self, limit: u32, offset: Option<String>) -> CandidateResult<ScrollPage>;

    /// Delete points by id; unknown ids are ignored
    async fn delete(&self, ids: Vec<Uuid>) -> CandidateResult<()>;

    /// Connectivity probe for readiness
    async fn health_check(&self) -> CandidateResult<()>;
}
