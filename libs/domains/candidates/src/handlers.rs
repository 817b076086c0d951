use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::{get, post},
};
use axum_helpers::{
    ApiKeyAuth, AppError, ValidatedQuery, api_key_middleware,
    auth::API_KEY_QUERY_PARAM,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::error::CandidateResult;
use crate::models::{
    CandidateHit, CollectionInfo, CreateIndexResponse, DeleteParams, DeleteRequest,
    DeleteResponse, IndexRequest, IndexResponse, InitResponse, ListParams, ListResponse,
    SearchParams,
};
use crate::repository::CandidateRepository;
use crate::service::CandidateService;

pub const TAG: &str = "candidates";

/// OpenAPI documentation for the candidate API
#[derive(OpenApi)]
#[openapi(
    paths(
        search,
        index_payload,
        list,
        delete_by_body,
        delete_by_query,
        create_index,
        init,
        collection,
    ),
    components(
        schemas(
            CandidateHit, CollectionInfo, IndexRequest, IndexResponse, DeleteRequest,
            DeleteResponse, ListResponse, CreateIndexResponse, InitResponse
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    modifiers(&ApiKeySecurity),
    tags(
        (name = TAG, description = "Semantic search over candidate résumés")
    )
)]
pub struct ApiDoc;

struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::ApiKey(ApiKey::Query(ApiKeyValue::new(API_KEY_QUERY_PARAM))),
            );
        }
    }
}

/// Candidate routes, all behind the API token.
pub fn router<R: CandidateRepository + 'static>(service: CandidateService<R>) -> Router {
    shared_router(Arc::new(service))
}

/// Same as [`router`] for a service the caller also holds, e.g. for `/ready`.
pub fn shared_router<R: CandidateRepository + 'static>(
    shared_service: Arc<CandidateService<R>>,
) -> Router {
    let auth = ApiKeyAuth::new(shared_service.config().api_token.as_str());

    Router::new()
        .route("/search", get(search))
        .route("/index-payload", post(index_payload))
        .route("/list", get(list))
        .route("/delete", post(delete_by_body).delete(delete_by_query))
        .route("/create-index", get(create_index))
        .route("/init", get(init))
        .route("/collection", get(collection))
        .route_layer(axum::middleware::from_fn_with_state(auth, api_key_middleware))
        .with_state(shared_service)
}

/// Semantic search
///
/// Embeds `q` and returns the closest candidates, best first.
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchParams),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Matching candidates", body = Vec<CandidateHit>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn search<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> CandidateResult<Json<Vec<CandidateHit>>> {
    let hits = service.search(params).await?;
    Ok(Json(hits))
}

/// Index candidates
///
/// Accepts a bare array or `{"candidates": [...]}`. The whole batch is
/// rejected if any record lacks `id_candidat`.
#[utoipa::path(
    post,
    path = "/index-payload",
    tag = TAG,
    request_body = IndexRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Candidates indexed", body = IndexResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn index_payload<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
    payload: Result<Json<IndexRequest>, JsonRejection>,
) -> Result<Json<IndexResponse>, AppError> {
    let Json(request) = payload?;
    let indexed = service.index(request.into_records()).await?;

    Ok(Json(IndexResponse {
        status: "ok".to_string(),
        indexed,
    }))
}

/// List candidates
///
/// Pages through the collection in point-id order. Pass `next_offset` back
/// as `offset` to get the following page.
#[utoipa::path(
    get,
    path = "/list",
    tag = TAG,
    params(ListParams),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "One page of candidates", body = ListResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn list<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
    ValidatedQuery(params): ValidatedQuery<ListParams>,
) -> CandidateResult<Json<ListResponse>> {
    let page = service.list(params).await?;
    Ok(Json(page))
}

/// Delete candidates (JSON body)
#[utoipa::path(
    post,
    path = "/delete",
    tag = TAG,
    request_body = DeleteRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Candidates deleted", body = DeleteResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn delete_by_body<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Json(request) = payload?;
    let deleted = service.delete(request.into_ids()).await?;
    Ok(Json(DeleteResponse {
        status: "ok".to_string(),
        deleted,
    }))
}

/// Delete candidates (query string)
#[utoipa::path(
    delete,
    path = "/delete",
    tag = TAG,
    params(DeleteParams),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Candidates deleted", body = DeleteResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn delete_by_query<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
    ValidatedQuery(params): ValidatedQuery<DeleteParams>,
) -> CandidateResult<Json<DeleteResponse>> {
    let deleted = service.delete(params.ids()).await?;
    Ok(Json(DeleteResponse {
        status: "ok".to_string(),
        deleted,
    }))
}

/// Create the domain keyword index
#[utoipa::path(
    get,
    path = "/create-index",
    tag = TAG,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Index created", body = CreateIndexResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn create_index<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
) -> CandidateResult<Json<CreateIndexResponse>> {
    let field = service.create_domain_index().await?;
    Ok(Json(CreateIndexResponse {
        status: "ok".to_string(),
        field,
    }))
}

/// Recreate the collection
///
/// Destructive: every stored candidate is dropped.
#[utoipa::path(
    get,
    path = "/init",
    tag = TAG,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Collection recreated", body = InitResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn init<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
) -> CandidateResult<Json<InitResponse>> {
    let (collection, dimension) = service.init_collection().await?;
    Ok(Json(InitResponse {
        status: "ok".to_string(),
        collection,
        dimension,
    }))
}

/// Collection info
#[utoipa::path(
    get,
    path = "/collection",
    tag = TAG,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Collection info", body = CollectionInfo),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
pub async fn collection<R: CandidateRepository>(
    State(service): State<Arc<CandidateService<R>>>,
) -> CandidateResult<Json<CollectionInfo>> {
    let info = service.collection_info().await?;
    Ok(Json(info))
}
