use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Payload key carrying the external candidate identifier
pub const ID_FIELD: &str = "id_candidat";

/// Namespace for deriving point ids from `id_candidat`.
pub const POINT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_9a52_3d4e_4b7a_9c0e_2f8d_5a61_b3c7);

/// Raw candidate payload as stored in the vector store
pub type Payload = Map<String, Value>;

/// Deterministic point id for a candidate identifier.
///
/// Re-indexing the same `id_candidat` overwrites the same point, and deletes
/// can address it without a lookup.
pub fn point_id_for(id_candidat: &str) -> Uuid {
    Uuid::new_v5(&POINT_ID_NAMESPACE, id_candidat.as_bytes())
}

/// Text sent to the embedding model: every non-blank string field, in key
/// order, separated by single spaces.
pub fn text_blob(payload: &Payload) -> String {
    let mut keys: Vec<&String> = payload.keys().collect();
    keys.sort();

    keys.into_iter()
        .filter_map(|k| payload.get(k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Trimmed, non-empty `id_candidat` of a payload, if any. Numbers are
/// accepted and rendered as strings.
pub fn candidate_id(payload: &Payload) -> Option<String> {
    match payload.get(ID_FIELD)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ===== Repository-level types =====

/// A point ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

/// Search match returned by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub id: String,
    pub score: f32,
    pub payload: Payload,
}

/// Stored point without its vector.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCandidate {
    pub id: String,
    pub payload: Payload,
}

/// One page of a scroll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollPage {
    pub items: Vec<StoredCandidate>,
    /// Cursor for the next page; `None` once the collection is exhausted
    pub next_offset: Option<String>,
}

/// Exact keyword match on one payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFilter {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    pub points_count: u64,
    pub dimension: u64,
    /// e.g. `Cosine`
    pub distance: String,
    /// green | yellow | red | grey
    pub status: String,
}

// ===== HTTP DTOs =====

/// Query for `GET /search`.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query
    #[validate(custom(function = "not_blank"))]
    pub q: String,
    /// Restrict to one domain tag
    #[serde(default)]
    pub domain: Option<String>,
    /// Alias of `domain`; ignored when `domain` is set
    #[serde(default)]
    pub domainemycv: Option<String>,
    /// Number of hits, 1-100, default 10
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u64>,
}

impl SearchParams {
    /// Requested domain tag, trimmed. `domain` wins over `domainemycv`.
    pub fn domain(&self) -> Option<&str> {
        trimmed_non_blank(self.domain.as_deref())
            .or_else(|| trimmed_non_blank(self.domainemycv.as_deref()))
    }
}

fn trimmed_non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub const DEFAULT_SEARCH_LIMIT: u64 = 10;

/// Query for `GET /list`.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page size, 1-1000, default 100
    #[validate(range(min = 1, max = 1000))]
    #[serde(default)]
    pub limit: Option<u32>,
    /// `next_offset` from the previous page
    #[serde(default)]
    pub offset: Option<String>,
}

pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Query for `DELETE /delete`.
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    /// Comma-separated `id_candidat` values
    pub ids: String,
}

impl DeleteParams {
    pub fn ids(&self) -> Vec<String> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// `POST /index-payload` body: a bare array or `{"candidates": [...]}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum IndexRequest {
    Batch(Vec<Value>),
    Wrapped {
        candidates: Vec<Value>,
    },
}

impl IndexRequest {
    pub fn into_records(self) -> Vec<Value> {
        match self {
            IndexRequest::Batch(records) => records,
            IndexRequest::Wrapped { candidates } => candidates,
        }
    }
}

/// `POST /delete` body: a bare array of ids or `{"ids": [...]}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum DeleteRequest {
    Ids(Vec<String>),
    Wrapped { ids: Vec<String> },
}

impl DeleteRequest {
    pub fn into_ids(self) -> Vec<String> {
        match self {
            DeleteRequest::Ids(ids) | DeleteRequest::Wrapped { ids } => ids,
        }
    }
}

/// One search hit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CandidateHit {
    /// Vector store point id
    pub id: String,
    pub score: f32,
    #[schema(value_type = Option<String>)]
    pub id_candidat: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub nom: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub prenom: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[schema(value_type = Option<String>)]
    pub poste_recherche_candidat: Option<Value>,
}

impl CandidateHit {
    pub fn from_scored(hit: ScoredCandidate) -> Self {
        let field = |key: &str| hit.payload.get(key).cloned();
        Self {
            id_candidat: field(ID_FIELD),
            nom: field("nom_candidat"),
            prenom: field("prenom_candidat"),
            email: field("email_candidat"),
            poste_recherche_candidat: field("poste_recherche_candidat"),
            id: hit.id,
            score: hit.score,
        }
    }
}

/// Listed record: point id plus the flattened payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListedCandidate {
    pub id: String,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse {
    pub count: usize,
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<ListedCandidate>,
    pub next_offset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IndexResponse {
    pub status: String,
    pub indexed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub status: String,
    pub deleted: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateIndexResponse {
    pub status: String,
    pub field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InitResponse {
    pub status: String,
    pub collection: String,
    pub dimension: u64,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}
