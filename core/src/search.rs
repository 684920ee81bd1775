use crate::ranker::rank;
use crate::store::ReviewStore;
use crate::vectorizer::vectorize;
use crate::{ReviewId, SearchError};
use serde::Serialize;

/// One similarity-search hit. `similarity` is cosine similarity in [0, 1]
/// since TF-IDF weights are non-negative.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarReview {
    pub id: ReviewId,
    pub text: String,
    pub similarity: f32,
}

/// Find the `k` reviews most similar to `query`.
///
/// The corpus is fetched fresh from the store on every call and a joint
/// vector space is built over `[query] ++ corpus`, so query and corpus
/// vectors are directly comparable; row 0 is the query and is never a
/// ranking candidate. Nothing is cached between calls: the vocabulary and
/// matrix are local to this invocation.
///
/// An empty or all-stopword query is not an error; it produces a zero
/// vector and every review scores 0.0, ordered by fetch order. Store
/// failures propagate unchanged.
pub fn find_similar(
    store: &dyn ReviewStore,
    query: &str,
    k: usize,
) -> Result<Vec<SimilarReview>, SearchError> {
    let reviews = store.fetch_all()?;
    if reviews.is_empty() {
        return Ok(Vec::new());
    }

    let mut batch: Vec<&str> = Vec::with_capacity(reviews.len() + 1);
    batch.push(query);
    batch.extend(reviews.iter().map(|r| r.text.as_str()));

    let (vocabulary, matrix) = vectorize(&batch);
    let query_vector = &matrix[0];
    let corpus_vectors = &matrix[1..];

    let ranked = rank(query_vector, corpus_vectors, k);
    tracing::debug!(
        corpus = reviews.len(),
        vocabulary = vocabulary.len(),
        hits = ranked.len(),
        "similarity search"
    );

    Ok(ranked
        .into_iter()
        .map(|(i, similarity)| SimilarReview {
            id: reviews[i].id,
            text: reviews[i].text.clone(),
            similarity,
        })
        .collect())
}
