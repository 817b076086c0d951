use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use observability::CandidateMetrics;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::{CandidateConfig, DEFAULT_DOMAIN};
use crate::embedding::{DEFAULT_EMBEDDING_BATCH_SIZE, EmbeddingProvider};
use crate::error::{CandidateError, CandidateResult};
use crate::models::{
    CandidateHit, CandidatePoint, CollectionInfo, DEFAULT_LIST_LIMIT, DEFAULT_SEARCH_LIMIT,
    DomainFilter, ID_FIELD, ListParams, ListResponse, ListedCandidate, Payload, SearchParams,
    candidate_id, point_id_for, text_blob,
};
use crate::repository::CandidateRepository;

/// Candidate search service
///
/// Embeds text through the configured provider and delegates storage and
/// similarity search to the repository.
pub struct CandidateService<R: CandidateRepository> {
    repository: R,
    embedder: Arc<dyn EmbeddingProvider>,
    config: CandidateConfig,
    embed_batch_size: usize,
}

impl<R: CandidateRepository> CandidateService<R> {
    pub fn new(repository: R, embedder: Arc<dyn EmbeddingProvider>, config: CandidateConfig) -> Self {
        Self {
            repository,
            embedder,
            config,
            embed_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    /// Cap on texts per provider request. Zero is treated as one.
    pub fn with_embed_batch_size(mut self, size: usize) -> Self {
        self.embed_batch_size = size.max(1);
        self
    }

    pub fn config(&self) -> &CandidateConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    // ===== Embedding =====

    fn check_dimension(&self, vector: &[f32]) -> CandidateResult<()> {
        if vector.len() as u64 != self.config.vector_size {
            return Err(CandidateError::Embedding(format!(
                "Embedding has dimension {}, expected {}",
                vector.len(),
                self.config.vector_size
            )));
        }
        Ok(())
    }

    async fn embed_one(&self, text: &str) -> CandidateResult<Vec<f32>> {
        let start = Instant::now();
        let vector = self.embedder.embed(text).await?;
        CandidateMetrics::record_embedding(self.embedder.name(), 1, start.elapsed().as_secs_f64());

        self.check_dimension(&vector)?;
        Ok(vector)
    }

    /// Embed in provider-sized chunks, preserving input order.
    async fn embed_many(&self, texts: &[String]) -> CandidateResult<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(self.embed_batch_size) {
            let start = Instant::now();
            let batch = self.embedder.embed_batch(chunk).await?;
            CandidateMetrics::record_embedding(
                self.embedder.name(),
                chunk.len(),
                start.elapsed().as_secs_f64(),
            );

            if batch.len() != chunk.len() {
                return Err(CandidateError::Embedding(format!(
                    "Provider returned {} embeddings for {} texts",
                    batch.len(),
                    chunk.len()
                )));
            }
            for vector in &batch {
                self.check_dimension(vector)?;
            }
            vectors.extend(batch);
        }
        Ok(vectors)
    }

    // ===== Queries =====

    /// Semantic search, optionally restricted to one domain tag.
    #[instrument(skip(self, params), fields(limit = params.limit, domain = ?params.domain()))]
    pub async fn search(&self, params: SearchParams) -> CandidateResult<Vec<CandidateHit>> {
        let start = Instant::now();
        let result = self.search_inner(&params).await;

        match &result {
            Ok(hits) => CandidateMetrics::record_search(
                params.domain().is_some(),
                hits.len(),
                start.elapsed().as_secs_f64(),
            ),
            Err(e) => CandidateMetrics::record_error("search", e.kind()),
        }
        result
    }

    async fn search_inner(&self, params: &SearchParams) -> CandidateResult<Vec<CandidateHit>> {
        let query = params.q.trim();
        if query.is_empty() {
            return Err(CandidateError::Validation("q must not be empty".to_string()));
        }

        let vector = self.embed_one(query).await?;

        let filter = params.domain().map(|d| DomainFilter {
            field: self.config.domain_field.clone(),
            value: d.to_string(),
        });

        let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let hits = self.repository.search(vector, filter, limit).await?;

        Ok(hits.into_iter().map(CandidateHit::from_scored).collect())
    }

    /// One page of stored candidates. Records without an `id_candidat` are
    /// skipped.
    #[instrument(skip(self))]
    pub async fn list(&self, params: ListParams) -> CandidateResult<ListResponse> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let page = self.repository.scroll(limit, params.offset).await?;

        let items: Vec<ListedCandidate> = page
            .items
            .into_iter()
            .filter(|c| candidate_id(&c.payload).is_some())
            .map(|c| ListedCandidate {
                id: c.id,
                payload: c.payload,
            })
            .collect();

        Ok(ListResponse {
            count: items.len(),
            items,
            next_offset: page.next_offset,
        })
    }

    pub async fn collection_info(&self) -> CandidateResult<CollectionInfo> {
        self.repository
            .collection_info()
            .await?
            .ok_or_else(|| CandidateError::CollectionNotFound(self.config.collection_name.clone()))
    }

    // ===== Writes =====

    /// Validate, embed and upsert a batch. Nothing is written unless every
    /// record is valid. A repeated `id_candidat` keeps the last record; the
    /// count is of distinct ids.
    #[instrument(skip(self, records), fields(batch = records.len()))]
    pub async fn index(&self, records: Vec<Value>) -> CandidateResult<usize> {
        let result = self.index_inner(records).await;
        match &result {
            Ok(count) => CandidateMetrics::record_indexed(*count),
            Err(e) => CandidateMetrics::record_error("index", e.kind()),
        }
        result
    }

    async fn index_inner(&self, records: Vec<Value>) -> CandidateResult<usize> {
        if records.is_empty() {
            return Err(CandidateError::Validation(
                "at least one candidate is required".to_string(),
            ));
        }

        let mut prepared: Vec<(String, Payload)> = Vec::with_capacity(records.len());
        let mut slots: HashMap<String, usize> = HashMap::new();
        for (position, record) in records.into_iter().enumerate() {
            let Value::Object(mut payload) = record else {
                return Err(CandidateError::Validation(format!(
                    "candidate #{} is not a JSON object",
                    position
                )));
            };

            let id = candidate_id(&payload).ok_or_else(|| {
                CandidateError::Validation(format!(
                    "candidate #{} is missing a non-empty id_candidat",
                    position
                ))
            })?;

            if payload.get(ID_FIELD).is_some_and(Value::is_string) {
                payload.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            }
            self.apply_default_domain(&mut payload);

            match slots.get(&id) {
                Some(&slot) => prepared[slot] = (id, payload),
                None => {
                    slots.insert(id.clone(), prepared.len());
                    prepared.push((id, payload));
                }
            }
        }

        let texts: Vec<String> = prepared.iter().map(|(_, p)| text_blob(p)).collect();
        let vectors = self.embed_many(&texts).await?;

        let points: Vec<CandidatePoint> = prepared
            .into_iter()
            .zip(vectors)
            .map(|((id, payload), vector)| CandidatePoint {
                id: point_id_for(&id),
                vector,
                payload,
            })
            .collect();

        let count = points.len();
        self.repository.upsert(points).await?;

        info!(count, collection = %self.config.collection_name, "Candidates indexed");
        Ok(count)
    }

    fn apply_default_domain(&self, payload: &mut Payload) {
        let field = &self.config.domain_field;
        let has_domain = match payload.get(field) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if !has_domain {
            payload.insert(field.clone(), Value::String(DEFAULT_DOMAIN.to_string()));
        }
    }

    /// Delete candidates by `id_candidat`. Returns the number of distinct
    /// ids requested.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete(&self, ids: Vec<String>) -> CandidateResult<usize> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .into_iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && seen.insert(id.clone()))
            .collect();

        if ids.is_empty() {
            return Err(CandidateError::Validation(
                "at least one id is required".to_string(),
            ));
        }

        let count = ids.len();
        let point_ids = ids.iter().map(|id| point_id_for(id)).collect();

        match self.repository.delete(point_ids).await {
            Ok(()) => {
                CandidateMetrics::record_deleted(count);
                info!(count, "Candidates deleted");
                Ok(count)
            }
            Err(e) => {
                CandidateMetrics::record_error("delete", e.kind());
                Err(e)
            }
        }
    }

    // ===== Collection Management =====

    /// Keyword index on the domain field. Returns the field name.
    pub async fn create_domain_index(&self) -> CandidateResult<String> {
        self.repository
            .create_domain_index(&self.config.domain_field)
            .await?;
        info!(field = %self.config.domain_field, "Domain index created");
        Ok(self.config.domain_field.clone())
    }

    /// Destructive: drop and recreate the collection.
    pub async fn init_collection(&self) -> CandidateResult<(String, u64)> {
        warn!(
            collection = %self.config.collection_name,
            "Recreating collection, all points will be lost"
        );
        self.repository
            .recreate_collection(self.config.vector_size)
            .await?;
        Ok((self.config.collection_name.clone(), self.config.vector_size))
    }

    // ===== Health =====

    pub async fn store_health(&self) -> CandidateResult<()> {
        self.repository.health_check().await
    }

    pub async fn embedder_health(&self) -> CandidateResult<()> {
        self.embedder.health_check().await
    }
}
