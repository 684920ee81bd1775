pub mod reply;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use reviewlens_core::analytics::{analyze, AnalyticsReport};
use reviewlens_core::search::{find_similar, SimilarReview};
use reviewlens_core::store::{ReviewQuery, ReviewStore};
use reviewlens_core::{NewReview, Review, ReviewId, SearchError, StoreError};
use reply::{ReplyClient, ReplySuggestion};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, AllowOrigin, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReviewStore>,
    pub reply: Option<Arc<ReplyClient>>,
}

type ApiError = (StatusCode, String);

fn store_error(err: StoreError) -> ApiError {
    tracing::error!(error = %err, "store failure");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn search_error(err: SearchError) -> ApiError {
    match err {
        SearchError::Storage(inner) => store_error(inner),
    }
}

/// CORS from the CORS_ALLOW_ORIGIN env var (comma-separated origins),
/// permissive when unset.
fn cors_layer() -> CorsLayer {
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    }
}

pub fn build_app(store: Arc<dyn ReviewStore>, reply: Option<Arc<ReplyClient>>) -> Router {
    let state = AppState { store, reply };
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/ingest", post(ingest_handler))
        .route("/reviews", get(reviews_handler))
        .route("/analytics", get(analytics_handler))
        .route("/search", get(search_handler))
        .route("/reviews/:id/suggest-reply", post(suggest_reply_handler))
        .with_state(state)
        .layer(cors_layer())
}

async fn ingest_handler(
    State(state): State<AppState>,
    Json(reviews): Json<Vec<NewReview>>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let mut created = Vec::with_capacity(reviews.len());
    for review in reviews {
        created.push(state.store.create(review).map_err(store_error)?);
    }
    tracing::info!(count = created.len(), "ingested reviews");
    Ok(Json(created))
}

#[derive(Deserialize)]
pub struct ReviewsParams {
    pub location: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

async fn reviews_handler(
    State(state): State<AppState>,
    Query(params): Query<ReviewsParams>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let query = ReviewQuery {
        location: params.location,
        q: params.q,
        skip: params.skip,
        limit: params.limit,
    };
    let reviews = state.store.list(&query).map_err(store_error)?;
    Ok(Json(reviews))
}

async fn analytics_handler(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let reviews = state.store.fetch_all().map_err(store_error)?;
    Ok(Json(analyze(&reviews)))
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: i64,
}

fn default_k() -> i64 {
    5
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SimilarReview>,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    // Reject bad k before any corpus fetch or vectorization cost.
    if params.k < 1 {
        return Err((StatusCode::BAD_REQUEST, format!("k must be >= 1, got {}", params.k)));
    }
    let results =
        find_similar(state.store.as_ref(), &params.q, params.k as usize).map_err(search_error)?;
    Ok(Json(SearchResponse { query: params.q, results }))
}

async fn suggest_reply_handler(
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<Json<ReplySuggestion>, ApiError> {
    let client = state.reply.as_ref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "reply suggestions not configured (OPENAI_API_KEY unset)".to_owned(),
    ))?;
    let review = state
        .store
        .get(id)
        .map_err(store_error)?
        .ok_or((StatusCode::NOT_FOUND, format!("review {id} not found")))?;

    match client.suggest(&review.text).await {
        Ok(suggestion) => Ok(Json(suggestion)),
        Err(err) => {
            tracing::warn!(error = %err, "reply service failure");
            Err((StatusCode::BAD_GATEWAY, err.to_string()))
        }
    }
}
