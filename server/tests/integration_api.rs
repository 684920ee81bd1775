use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use reviewlens_core::store::{MemoryStore, ReviewQuery, ReviewStore, SledStore, StoreConfig};
use reviewlens_core::{NewReview, Review, ReviewId, StoreError};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn review(location: &str, rating: u8, text: &str) -> NewReview {
    NewReview {
        location: location.into(),
        rating,
        text: text.into(),
        date: "2024-03-01".into(),
    }
}

fn app_with_seeded_store() -> Router {
    let store = MemoryStore::new();
    store.create(review("downtown", 5, "Great service and friendly staff")).unwrap();
    store.create(review("airport", 2, "The food was cold and the price was high")).unwrap();
    store.create(review("downtown", 3, "Rooms were clean enough")).unwrap();
    reviewlens_server::build_app(Arc::new(store), None)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let app = app_with_seeded_store();
    let (status, body) = get(app, "/search?q=friendly+staff+service&k=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "friendly staff service");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["id"], 0);
    let top = results[0]["similarity"].as_f64().unwrap();
    let second = results[1]["similarity"].as_f64().unwrap();
    assert!(top > second);
}

#[tokio::test]
async fn search_rejects_non_positive_k() {
    let (status, _) = get(app_with_seeded_store(), "/search?q=staff&k=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = get(app_with_seeded_store(), "/search?q=staff&k=-3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_defaults_k_to_five() {
    let (status, body) = get(app_with_seeded_store(), "/search?q=staff").await;
    assert_eq!(status, StatusCode::OK);
    // Three reviews in the store, so the default k=5 is capped.
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn reviews_filters_and_paginates() {
    let app = app_with_seeded_store();
    let (status, body) = get(app.clone(), "/reviews?location=downtown").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = get(app.clone(), "/reviews?q=COLD").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 1);

    let (_, body) = get(app, "/reviews?skip=2&limit=5").await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], 2);
}

#[tokio::test]
async fn analytics_counts_sentiment_and_topics() {
    let (status, body) = get(app_with_seeded_store(), "/analytics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"]["positive"], 1);
    assert_eq!(body["sentiment"]["neutral"], 1);
    assert_eq!(body["sentiment"]["negative"], 1);
    assert_eq!(body["topics"]["service"], 1);
    assert_eq!(body["topics"]["price"], 1);
    assert_eq!(body["topics"]["cleanliness"], 1);
}

#[tokio::test]
async fn ingest_persists_and_search_sees_it() {
    let dir = tempdir().unwrap();
    let store = Arc::new(SledStore::open(&StoreConfig::new(dir.path())).unwrap());
    let app = reviewlens_server::build_app(store, None);

    let payload = json!([
        {"location": "harbor", "rating": 4, "text": "Lovely espresso", "date": "2024-04-02"},
        {"location": "harbor", "rating": 1, "text": "Burnt espresso", "date": "2024-04-03"}
    ]);
    let (status, created) = post_json(app.clone(), "/ingest", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created.as_array().unwrap().len(), 2);

    let (status, body) = get(app, "/search?q=espresso&k=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn suggest_reply_maps_missing_review_to_404() {
    // Reply client configured against an unroutable endpoint; the unknown
    // id must be rejected before any upstream call happens.
    let store = MemoryStore::new();
    let config = reviewlens_server::reply::ReplyConfig {
        api_key: "test".into(),
        model: "gpt-4".into(),
        base_url: "http://127.0.0.1:9".into(),
    };
    let client = Arc::new(reviewlens_server::reply::ReplyClient::new(config));
    let app = reviewlens_server::build_app(Arc::new(store), Some(client));
    let (status, _) = post_json(app, "/reviews/42/suggest-reply", json!(null)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn suggest_reply_unconfigured_is_503() {
    let (status, _) =
        post_json(app_with_seeded_store(), "/reviews/0/suggest-reply", json!(null)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

/// Store double whose every operation fails with an i/o error.
struct UnreachableStore;

fn outage() -> StoreError {
    StoreError::Db(std::io::Error::new(std::io::ErrorKind::Other, "simulated outage").into())
}

impl ReviewStore for UnreachableStore {
    fn create(&self, _review: NewReview) -> Result<Review, StoreError> {
        Err(outage())
    }

    fn get(&self, _id: ReviewId) -> Result<Option<Review>, StoreError> {
        Err(outage())
    }

    fn fetch_all(&self) -> Result<Vec<Review>, StoreError> {
        Err(outage())
    }

    fn list(&self, _query: &ReviewQuery) -> Result<Vec<Review>, StoreError> {
        Err(outage())
    }
}

#[tokio::test]
async fn search_maps_store_failure_to_500_with_reason() {
    let app = reviewlens_server::build_app(Arc::new(UnreachableStore), None);
    let resp = app
        .oneshot(Request::get("/search?q=staff").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("simulated outage"));
}

#[tokio::test]
async fn suggest_reply_upstream_failure_is_502() {
    let store = MemoryStore::new();
    store.create(review("downtown", 5, "Great service")).unwrap();
    // Unroutable upstream: the request is attempted and fails as a
    // network error, which must surface as a bad gateway.
    let config = reviewlens_server::reply::ReplyConfig {
        api_key: "test".into(),
        model: "gpt-4".into(),
        base_url: "http://127.0.0.1:9".into(),
    };
    let client = Arc::new(reviewlens_server::reply::ReplyClient::new(config));
    let app = reviewlens_server::build_app(Arc::new(store), Some(client));
    let (status, _) = post_json(app, "/reviews/0/suggest-reply", json!(null)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn empty_store_search_is_empty_not_error() {
    let app = reviewlens_server::build_app(Arc::new(MemoryStore::new()), None);
    let (status, body) = get(app, "/search?q=anything").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["results"].as_array().unwrap().is_empty());
}
