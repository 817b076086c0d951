//! In-process candidate store for tests and local development.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CandidateError, CandidateResult};
use crate::models::{
    CandidatePoint, CollectionInfo, DomainFilter, Payload, ScoredCandidate, ScrollPage,
    StoredCandidate,
};
use crate::repository::CandidateRepository;

struct Collection {
    dimension: u64,
    points: BTreeMap<Uuid, (Vec<f32>, Payload)>,
    indexed_fields: HashSet<String>,
}

impl Collection {
    fn new(dimension: u64) -> Self {
        Self {
            dimension,
            points: BTreeMap::new(),
            indexed_fields: HashSet::new(),
        }
    }
}

/// Brute-force cosine search over a map guarded by a `tokio` RwLock.
pub struct InMemoryCandidateRepository {
    name: String,
    collection: RwLock<Option<Collection>>,
}

impl InMemoryCandidateRepository {
    /// Repository with the collection already created.
    pub fn new(name: impl Into<String>, dimension: u64) -> Self {
        Self {
            name: name.into(),
            collection: RwLock::new(Some(Collection::new(dimension))),
        }
    }

    /// Repository whose collection does not exist yet.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: RwLock::new(None),
        }
    }

    pub async fn len(&self) -> usize {
        self.collection
            .read()
            .await
            .as_ref()
            .map_or(0, |c| c.points.len())
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn has_index(&self, field: &str) -> bool {
        self.collection
            .read()
            .await
            .as_ref()
            .is_some_and(|c| c.indexed_fields.contains(field))
    }

    fn missing(&self) -> CandidateError {
        CandidateError::CollectionNotFound(self.name.clone())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn matches(payload: &Payload, filter: &DomainFilter) -> bool {
    match payload.get(&filter.field) {
        Some(serde_json::Value::String(s)) => s == &filter.value,
        Some(serde_json::Value::Array(values)) => values
            .iter()
            .any(|v| v.as_str() == Some(filter.value.as_str())),
        _ => false,
    }
}

#[async_trait]
impl CandidateRepository for InMemoryCandidateRepository {
    async fn recreate_collection(&self, dimension: u64) -> CandidateResult<()> {
        *self.collection.write().await = Some(Collection::new(dimension));
        Ok(())
    }

    async fn create_domain_index(&self, field: &str) -> CandidateResult<()> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;
        collection.indexed_fields.insert(field.to_string());
        Ok(())
    }

    async fn collection_info(&self) -> CandidateResult<Option<CollectionInfo>> {
        Ok(self
            .collection
            .read()
            .await
            .as_ref()
            .map(|c| CollectionInfo {
                name: self.name.clone(),
                points_count: c.points.len() as u64,
                dimension: c.dimension,
                distance: "Cosine".to_string(),
                status: "green".to_string(),
            }))
    }

    async fn upsert(&self, points: Vec<CandidatePoint>) -> CandidateResult<()> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;

        // validate everything first so a bad point leaves the map untouched
        if let Some(bad) = points
            .iter()
            .find(|p| p.vector.len() as u64 != collection.dimension)
        {
            return Err(CandidateError::Store(format!(
                "Wrong vector dimension: expected {}, got {}",
                collection.dimension,
                bad.vector.len()
            )));
        }

        for point in points {
            collection
                .points
                .insert(point.id, (point.vector, point.payload));
        }
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        filter: Option<DomainFilter>,
        limit: u64,
    ) -> CandidateResult<Vec<ScoredCandidate>> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;

        let mut hits: Vec<ScoredCandidate> = collection
            .points
            .iter()
            .filter(|(_, (_, payload))| filter.as_ref().is_none_or(|f| matches(payload, f)))
            .map(|(id, (stored, payload))| ScoredCandidate {
                id: id.to_string(),
                score: cosine(&vector, stored),
                payload: payload.clone(),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit as usize);
        Ok(hits)
    }

    async fn scroll(&self, limit: u32, offset: Option<String>) -> CandidateResult<ScrollPage> {
        let guard = self.collection.read().await;
        let collection = guard.as_ref().ok_or_else(|| self.missing())?;

        let start = match offset {
            Some(raw) => Some(
                Uuid::parse_str(&raw)
                    .map_err(|_| CandidateError::Validation(format!("Invalid offset: {}", raw)))?,
            ),
            None => None,
        };

        let mut iter = collection
            .points
            .range(start.unwrap_or(Uuid::nil())..)
            .map(|(id, (_, payload))| StoredCandidate {
                id: id.to_string(),
                payload: payload.clone(),
            });

        let items: Vec<StoredCandidate> = iter.by_ref().take(limit as usize).collect();
        let next_offset = iter.next().map(|c| c.id);

        Ok(ScrollPage { items, next_offset })
    }

    async fn delete(&self, ids: Vec<Uuid>) -> CandidateResult<()> {
        let mut guard = self.collection.write().await;
        let collection = guard.as_mut().ok_or_else(|| self.missing())?;
        for id in ids {
            collection.points.remove(&id);
        }
        Ok(())
    }

    async fn health_check(&self) -> CandidateResult<()> {
        Ok(())
    }
}
