use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    self, Condition, CreateCollectionBuilder, CreateFieldIndexCollectionBuilder,
    DeletePointsBuilder, Distance, FieldType, Filter, PointId, PointStruct, PointsIdsList,
    ScrollPointsBuilder, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::QdrantConfig;
use crate::error::{CandidateError, CandidateResult};
use crate::models::{
    CandidatePoint, CollectionInfo, DomainFilter, Payload, ScoredCandidate, ScrollPage,
    StoredCandidate,
};
use crate::repository::CandidateRepository;

/// Qdrant-backed implementation of CandidateRepository
pub struct QdrantRepository {
    client: Qdrant,
    collection: String,
}

impl QdrantRepository {
    pub fn new(config: &QdrantConfig, collection: impl Into<String>) -> CandidateResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = &config.api_key {
            builder = builder.api_key(api_key.clone());
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| CandidateError::Store(format!("Failed to build client: {}", e)))?;

        Ok(Self::from_client(client, collection))
    }

    pub fn from_client(client: Qdrant, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    fn uuid_to_point_id(id: Uuid) -> PointId {
        PointId::from(id.to_string())
    }

    fn point_id_to_string(point_id: Option<&PointId>) -> CandidateResult<String> {
        match point_id.and_then(|p| p.point_id_options.as_ref()) {
            Some(qdrant::point_id::PointIdOptions::Uuid(uuid)) => Ok(uuid.clone()),
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Ok(num.to_string()),
            None => Err(CandidateError::Internal("Missing point ID".to_string())),
        }
    }

    /// Scroll cursors are whatever `next_page_offset` rendered to: a UUID or
    /// an unsigned integer.
    fn parse_offset(raw: &str) -> CandidateResult<PointId> {
        if let Ok(num) = raw.parse::<u64>() {
            return Ok(PointId::from(num));
        }
        Uuid::parse_str(raw)
            .map(Self::uuid_to_point_id)
            .map_err(|_| CandidateError::Validation(format!("Invalid offset: {}", raw)))
    }

    fn payload_to_qdrant(payload: Payload) -> HashMap<String, QdrantValue> {
        payload
            .into_iter()
            .map(|(key, val)| (key, json_to_qdrant_value(val)))
            .collect()
    }

    fn qdrant_to_payload(payload: HashMap<String, QdrantValue>) -> Payload {
        payload
            .into_iter()
            .map(|(key, val)| (key, qdrant_value_to_json(val)))
            .collect()
    }

    fn collection_info_from(
        &self,
        result: qdrant::CollectionInfo,
    ) -> CollectionInfo {
        let (dimension, distance) = Self::vector_params(&result.config);
        CollectionInfo {
            name: self.collection.clone(),
            points_count: result.points_count.unwrap_or(0),
            dimension,
            distance: distance.as_str_name().to_string(),
            status: result.status().as_str_name().to_ascii_lowercase(),
        }
    }

    fn vector_params(config: &Option<qdrant::CollectionConfig>) -> (u64, Distance) {
        let params = config
            .as_ref()
            .and_then(|c| c.params.as_ref())
            .and_then(|p| p.vectors_config.as_ref())
            .and_then(|vc| vc.config.as_ref());

        match params {
            Some(qdrant::vectors_config::Config::Params(p)) => (p.size, p.distance()),
            // named vectors: report the first one
            Some(qdrant::vectors_config::Config::ParamsMap(map)) => map
                .map
                .values()
                .next()
                .map_or((0, Distance::Cosine), |p| (p.size, p.distance())),
            None => (0, Distance::Cosine),
        }
    }
}

fn json_to_qdrant_value(val: Value) -> QdrantValue {
    use qdrant::value::Kind;

    let kind = match val {
        Value::Null => Kind::NullValue(0),
        Value::Bool(b) => Kind::BoolValue(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Kind::IntegerValue(i),
            None => Kind::DoubleValue(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => Kind::StringValue(s),
        Value::Array(items) => Kind::ListValue(qdrant::ListValue {
            values: items.into_iter().map(json_to_qdrant_value).collect(),
        }),
        Value::Object(map) => Kind::StructValue(qdrant::Struct {
            fields: map
                .into_iter()
                .map(|(k, v)| (k, json_to_qdrant_value(v)))
                .collect(),
        }),
    };

    QdrantValue { kind: Some(kind) }
}

fn qdrant_value_to_json(val: QdrantValue) -> Value {
    use qdrant::value::Kind;

    match val.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(qdrant_value_to_json).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
    }
}

#[async_trait]
impl CandidateRepository for QdrantRepository {
    async fn recreate_collection(&self, dimension: u64) -> CandidateResult<()> {
        if self.client.collection_exists(&self.collection).await? {
            info!(collection = %self.collection, "Dropping existing collection");
            self.client.delete_collection(&self.collection).await?;
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension, Distance::Cosine)),
            )
            .await?;

        info!(collection = %self.collection, dimension, "Collection created");
        Ok(())
    }

    async fn create_domain_index(&self, field: &str) -> CandidateResult<()> {
        self.client
            .create_field_index(
                CreateFieldIndexCollectionBuilder::new(&self.collection, field, FieldType::Keyword)
                    .wait(true),
            )
            .await?;
        Ok(())
    }

    async fn collection_info(&self) -> CandidateResult<Option<CollectionInfo>> {
        if !self.client.collection_exists(&self.collection).await? {
            return Ok(None);
        }

        let info = self.client.collection_info(&self.collection).await?;
        let result = info
            .result
            .ok_or_else(|| CandidateError::Internal("Collection info missing result".to_string()))?;

        Ok(Some(self.collection_info_from(result)))
    }

    async fn upsert(&self, points: Vec<CandidatePoint>) -> CandidateResult<()> {
        let points: Vec<PointStruct> = points
            .into_iter()
            .map(|p| {
                PointStruct::new(
                    Self::uuid_to_point_id(p.id),
                    p.vector,
                    Self::payload_to_qdrant(p.payload),
                )
            })
            .collect();

        debug!(collection = %self.collection, count = points.len(), "Upserting points");
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        vector: Vec<f32>,
        filter: Option<DomainFilter>,
        limit: u64,
    ) -> CandidateResult<Vec<ScoredCandidate>> {
        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, limit).with_payload(true);

        if let Some(DomainFilter { field, value }) = filter {
            builder = builder.filter(Filter::must([Condition::matches(field, value)]));
        }

        let response = self.client.search_points(builder).await?;

        response
            .result
            .into_iter()
            .map(|point| {
                Ok(ScoredCandidate {
                    id: Self::point_id_to_string(point.id.as_ref())?,
                    score: point.score,
                    payload: Self::qdrant_to_payload(point.payload),
                })
            })
            .collect()
    }

    async fn scroll(&self, limit: u32, offset: Option<String>) -> CandidateResult<ScrollPage> {
        let mut builder = ScrollPointsBuilder::new(&self.collection)
            .limit(limit)
            .with_payload(true)
            .with_vectors(false);

        if let Some(raw) = offset {
            builder = builder.offset(Self::parse_offset(&raw)?);
        }

        let response = self.client.scroll(builder).await?;

        let items = response
            .result
            .into_iter()
            .map(|point| {
                Ok(StoredCandidate {
                    id: Self::point_id_to_string(point.id.as_ref())?,
                    payload: Self::qdrant_to_payload(point.payload),
                })
            })
            .collect::<CandidateResult<Vec<_>>>()?;

        let next_offset = response
            .next_page_offset
            .as_ref()
            .map(|p| Self::point_id_to_string(Some(p)))
            .transpose()?;

        Ok(ScrollPage { items, next_offset })
    }

    async fn delete(&self, ids: Vec<Uuid>) -> CandidateResult<()> {
        let ids: Vec<PointId> = ids.into_iter().map(Self::uuid_to_point_id).collect();

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(PointsIdsList { ids })
                    .wait(true),
            )
            .await?;
        Ok(())
    }

    async fn health_check(&self) -> CandidateResult<()> {
        self.client.health_check().await?;
        Ok(())
    }
}
