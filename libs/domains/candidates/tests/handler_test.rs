//! Handler tests for the candidates domain
//!
//! These drive `handlers::router` end to end against the in-memory
//! repository and a deterministic bag-of-words embedder, so they cover:
//! - API token enforcement on every route
//! - Query/body validation and the error envelope
//! - Index → search → delete → list round trips

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_candidates::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const TOKEN: &str = "test-token";
const DIM: usize = 256;

/// Hashes lowercase words into a fixed-size count vector.
struct BagOfWordsEmbedder;

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

fn bag_of_words(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0; DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        vector[(fnv1a(&word.to_lowercase()) % DIM as u64) as usize] += 1.0;
    }
    vector
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    fn name(&self) -> &'static str {
        "bag-of-words"
    }

    async fn embed(&self, text: &str) -> CandidateResult<Vec<f32>> {
        Ok(bag_of_words(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> CandidateResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| bag_of_words(t)).collect())
    }
}

fn config() -> CandidateConfig {
    CandidateConfig::new(TOKEN).with_vector_size(DIM as u64)
}

fn app_with(repository: InMemoryCandidateRepository) -> Router {
    let service = CandidateService::new(repository, Arc::new(BagOfWordsEmbedder), config());
    handlers::router(service)
}

fn app() -> Router {
    app_with(InMemoryCandidateRepository::new(DEFAULT_COLLECTION, DIM as u64))
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", TOKEN)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn sample_candidates() -> Value {
    json!([
        {
            "id_candidat": "c-1",
            "nom_candidat": "Martin",
            "prenom_candidat": "Alice",
            "email_candidat": "alice@example.com",
            "poste_recherche_candidat": "Rust backend developer",
            "domainemycv": "informatique"
        },
        {
            "id_candidat": "c-2",
            "nom_candidat": "Durand",
            "prenom_candidat": "Bruno",
            "email_candidat": "bruno@example.com",
            "poste_recherche_candidat": "Chef de cuisine pâtisserie",
            "domainemycv": "restauration"
        },
        {
            "id_candidat": "c-3",
            "nom_candidat": "Petit",
            "prenom_candidat": "Chloé",
            "poste_recherche_candidat": "Python developer data"
        }
    ])
}

async fn seed(app: &Router) {
    let response = app
        .clone()
        .oneshot(with_json("POST", "/index-payload", sample_candidates()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_every_route_requires_token() {
    let app = app();

    for (method, uri) in [
        ("GET", "/search?q=rust"),
        ("POST", "/index-payload"),
        ("GET", "/list"),
        ("POST", "/delete"),
        ("DELETE", "/delete?ids=c-1"),
        ("GET", "/create-index"),
        ("GET", "/init"),
        ("GET", "/collection"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{} {}", method, uri);

        let body: Value = json_body(response.into_body()).await;
        assert_eq!(body["error"], "UNAUTHORIZED");
        assert_eq!(body["message"], "unauthorized");
    }
}

#[tokio::test]
async fn test_wrong_token_is_rejected() {
    let request = Request::builder()
        .uri("/list?key=nope")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_accepted_from_query_param() {
    let request = Request::builder()
        .uri(format!("/list?key={}", TOKEN))
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_index_then_search_ranks_matching_candidate_first() {
    let app = app();

    let response = app
        .clone()
        .oneshot(with_json("POST", "/index-payload", sample_candidates()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let indexed: IndexResponse = json_body(response.into_body()).await;
    assert_eq!(indexed.status, "ok");
    assert_eq!(indexed.indexed, 3);

    let response = app
        .oneshot(get("/search?q=rust%20backend%20developer&limit=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let hits: Vec<CandidateHit> = json_body(response.into_body()).await;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id_candidat, Some(json!("c-1")));
    assert_eq!(hits[0].nom, Some(json!("Martin")));
    assert_eq!(hits[0].prenom, Some(json!("Alice")));
    assert_eq!(hits[0].email, Some(json!("alice@example.com")));
    assert_eq!(hits[0].id, point_id_for("c-1").to_string());
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn test_search_domain_filter() {
    let app = app();
    seed(&app).await;

    let response = app
        .clone()
        .oneshot(get("/search?q=developer&domain=restauration"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hits: Vec<CandidateHit> = json_body(response.into_body()).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id_candidat, Some(json!("c-2")));

    // Legacy parameter name
    let response = app
        .oneshot(get("/search?q=developer&domainemycv=autre"))
        .await
        .unwrap();
    let hits: Vec<CandidateHit> = json_body(response.into_body()).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id_candidat, Some(json!("c-3")));
}

#[tokio::test]
async fn test_search_domain_takes_precedence_over_alias() {
    let app = app();
    seed(&app).await;

    let response = app
        .oneshot(get("/search?q=developer&domain=restauration&domainemycv=autre"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let hits: Vec<CandidateHit> = json_body(response.into_body()).await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id_candidat, Some(json!("c-2")));
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let response = app().oneshot(get("/search?q=%20%20")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_search_rejects_missing_query() {
    let response = app().oneshot(get("/search")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "QUERY_EXTRACTION");
}

#[tokio::test]
async fn test_search_rejects_limit_out_of_range() {
    let app = app();
    for uri in ["/search?q=rust&limit=0", "/search?q=rust&limit=101"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_index_rejects_batch_with_missing_id() {
    let app = app();

    let response = app
        .clone()
        .oneshot(with_json(
            "POST",
            "/index-payload",
            json!([
                { "id_candidat": "ok-1", "nom_candidat": "Valid" },
                { "nom_candidat": "No id" }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    // Nothing from the rejected batch was written
    let response = app.oneshot(get("/list")).await.unwrap();
    let page: ListResponse = json_body(response.into_body()).await;
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn test_index_rejects_empty_batch() {
    let response = app()
        .oneshot(with_json("POST", "/index-payload", json!([])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_index_rejects_malformed_json() {
    let request = Request::builder()
        .method("POST")
        .uri("/index-payload")
        .header("x-api-key", TOKEN)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "JSON_EXTRACTION");
}

#[tokio::test]
async fn test_index_accepts_wrapped_body_and_defaults_domain() {
    let app = app();

    let response = app
        .clone()
        .oneshot(with_json(
            "POST",
            "/index-payload",
            json!({ "candidates": [{ "id_candidat": 42, "nom_candidat": "Numeric" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/list")).await.unwrap();
    let page: Value = json_body(response.into_body()).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["items"][0]["id_candidat"], 42);
    assert_eq!(page["items"][0]["domainemycv"], DEFAULT_DOMAIN);
    assert_eq!(page["items"][0]["id"], point_id_for("42").to_string());
}

#[tokio::test]
async fn test_reindex_same_id_overwrites() {
    let app = app();
    seed(&app).await;

    let response = app
        .clone()
        .oneshot(with_json(
            "POST",
            "/index-payload",
            json!([{ "id_candidat": "c-1", "nom_candidat": "Renamed" }]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/list")).await.unwrap();
    let page: Value = json_body(response.into_body()).await;
    assert_eq!(page["count"], 3);

    let items = page["items"].as_array().unwrap();
    let renamed = items.iter().find(|i| i["id_candidat"] == "c-1").unwrap();
    assert_eq!(renamed["nom_candidat"], "Renamed");
}

#[tokio::test]
async fn test_delete_with_body_removes_candidate() {
    let app = app();
    seed(&app).await;

    let response = app
        .clone()
        .oneshot(with_json("POST", "/delete", json!({ "ids": ["c-1", " "] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: DeleteResponse = json_body(response.into_body()).await;
    assert_eq!(deleted.status, "ok");
    assert_eq!(deleted.deleted, 1);

    let response = app.oneshot(get("/list")).await.unwrap();
    let page: Value = json_body(response.into_body()).await;
    assert_eq!(page["count"], 2);
    assert!(
        page["items"]
            .as_array()
            .unwrap()
            .iter()
            .all(|i| i["id_candidat"] != "c-1")
    );
}

#[tokio::test]
async fn test_delete_with_query_string() {
    let app = app();
    seed(&app).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/delete?ids=c-1,c-2")
        .header("x-api-key", TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let deleted: DeleteResponse = json_body(response.into_body()).await;
    assert_eq!(deleted.deleted, 2);

    let response = app.oneshot(get("/list")).await.unwrap();
    let page: ListResponse = json_body(response.into_body()).await;
    assert_eq!(page.count, 1);
}

#[tokio::test]
async fn test_padded_id_can_be_deleted() {
    let app = app();

    let response = app
        .clone()
        .oneshot(with_json(
            "POST",
            "/index-payload",
            json!([{ "id_candidat": " a1 ", "nom_candidat": "Padded" }]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.clone().oneshot(get("/list")).await.unwrap();
    let page: Value = json_body(response.into_body()).await;
    assert_eq!(page["items"][0]["id_candidat"], "a1");

    let response = app
        .clone()
        .oneshot(with_json("POST", "/delete", json!([" a1 "])))
        .await
        .unwrap();
    let deleted: DeleteResponse = json_body(response.into_body()).await;
    assert_eq!(deleted.deleted, 1);

    let response = app.oneshot(get("/list")).await.unwrap();
    let page: ListResponse = json_body(response.into_body()).await;
    assert_eq!(page.count, 0);
}

#[tokio::test]
async fn test_repeated_ids_are_counted_once() {
    let app = app();

    let response = app
        .clone()
        .oneshot(with_json(
            "POST",
            "/index-payload",
            json!([
                { "id_candidat": "dup", "nom_candidat": "First" },
                { "id_candidat": "dup", "nom_candidat": "Last" }
            ]),
        ))
        .await
        .unwrap();
    let indexed: IndexResponse = json_body(response.into_body()).await;
    assert_eq!(indexed.indexed, 1);

    let response = app.clone().oneshot(get("/list")).await.unwrap();
    let page: Value = json_body(response.into_body()).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["items"][0]["nom_candidat"], "Last");

    let response = app
        .oneshot(with_json("POST", "/delete", json!(["dup", "dup"])))
        .await
        .unwrap();
    let deleted: DeleteResponse = json_body(response.into_body()).await;
    assert_eq!(deleted.deleted, 1);
}

#[tokio::test]
async fn test_delete_rejects_empty_ids() {
    let response = app()
        .oneshot(with_json("POST", "/delete", json!([])))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_pages_through_collection() {
    let app = app();
    seed(&app).await;

    let response = app.clone().oneshot(get("/list?limit=2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first: ListResponse = json_body(response.into_body()).await;
    assert_eq!(first.count, 2);
    let offset = first.next_offset.expect("more pages");

    let response = app
        .oneshot(get(&format!("/list?limit=2&offset={}", offset)))
        .await
        .unwrap();
    let second: ListResponse = json_body(response.into_body()).await;
    assert_eq!(second.count, 1);
    assert!(second.next_offset.is_none());
}

#[tokio::test]
async fn test_list_rejects_limit_out_of_range() {
    let response = app().oneshot(get("/list?limit=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_collection_not_found_before_init() {
    let app = app_with(InMemoryCandidateRepository::empty(DEFAULT_COLLECTION));

    let response = app.clone().oneshot(get("/collection")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");

    let response = app.clone().oneshot(get("/init")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let init: InitResponse = json_body(response.into_body()).await;
    assert_eq!(init.status, "ok");
    assert_eq!(init.collection, DEFAULT_COLLECTION);
    assert_eq!(init.dimension, DIM as u64);

    let response = app.oneshot(get("/collection")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let info: CollectionInfo = json_body(response.into_body()).await;
    assert_eq!(info.points_count, 0);
    assert_eq!(info.dimension, DIM as u64);
}

#[tokio::test]
async fn test_init_drops_existing_points() {
    let app = app();
    seed(&app).await;

    let response = app.clone().oneshot(get("/init")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/collection")).await.unwrap();
    let info: CollectionInfo = json_body(response.into_body()).await;
    assert_eq!(info.points_count, 0);
}

#[tokio::test]
async fn test_create_index_reports_domain_field() {
    let response = app().oneshot(get("/create-index")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: CreateIndexResponse = json_body(response.into_body()).await;
    assert_eq!(body.status, "ok");
    assert_eq!(body.field, DEFAULT_DOMAIN_FIELD);
}

#[tokio::test]
async fn test_create_index_on_missing_collection_fails() {
    let app = app_with(InMemoryCandidateRepository::empty(DEFAULT_COLLECTION));
    let response = app.oneshot(get("/create-index")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let response = app().oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
