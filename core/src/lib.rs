pub mod analytics;
pub mod ranker;
pub mod search;
pub mod store;
pub mod tokenizer;
pub mod vectorizer;

use serde::{Deserialize, Serialize};

pub type ReviewId = u64;

/// A stored customer review. Metadata (location, rating, date) is carried
/// through untouched; only `text` participates in similarity scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub location: String,
    pub rating: u8,
    pub text: String,
    /// ISO-8601 day, e.g. "2024-03-01". Stored verbatim.
    pub date: String,
}

/// A review as submitted for ingestion, before the store assigns an id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub location: String,
    pub rating: u8,
    pub text: String,
    pub date: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store i/o error: {0}")]
    Db(#[from] sled::Error),
    #[error("corrupt record: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("storage failure during search: {0}")]
    Storage(#[from] StoreError),
}
