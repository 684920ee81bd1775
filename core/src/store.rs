use crate::{NewReview, Review, ReviewId, StoreError};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};

/// Browse filters for `ReviewStore::list`. Defaults mean "everything,
/// first page".
#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
    /// Exact location match.
    pub location: Option<String>,
    /// Case-insensitive substring match on the review text.
    pub q: Option<String>,
    pub skip: usize,
    pub limit: Option<usize>,
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Record-store boundary. `fetch_all` is the full scan the similarity
/// search consumes; the rest serves the browse/ingest surface.
pub trait ReviewStore: Send + Sync {
    fn create(&self, review: NewReview) -> Result<Review, StoreError>;
    fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError>;
    /// All reviews in ascending id order, which is insertion order.
    fn fetch_all(&self) -> Result<Vec<Review>, StoreError>;
    fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, StoreError>;
}

fn apply_query(all: Vec<Review>, query: &ReviewQuery) -> Vec<Review> {
    let needle = query.q.as_ref().map(|q| q.to_lowercase());
    all.into_iter()
        .filter(|r| match &query.location {
            Some(loc) => &r.location == loc,
            None => true,
        })
        .filter(|r| match &needle {
            Some(n) => r.text.to_lowercase().contains(n),
            None => true,
        })
        .skip(query.skip)
        .take(query.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .collect()
}

/// Explicit store configuration; constructed once in `main` and handed to
/// `SledStore::open`, never read from ambient globals.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

/// Embedded review store. Values are bincode-encoded `Review`s keyed by
/// big-endian id so iteration order is insertion order.
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let db = sled::open(&config.path)?;
        Ok(Self { db })
    }
}

impl ReviewStore for SledStore {
    fn create(&self, review: NewReview) -> Result<Review, StoreError> {
        let id = self.db.generate_id()?;
        let stored = Review {
            id,
            location: review.location,
            rating: review.rating,
            text: review.text,
            date: review.date,
        };
        let bytes = bincode::serialize(&stored)?;
        self.db.insert(id.to_be_bytes(), bytes)?;
        tracing::debug!(id, "stored review");
        Ok(stored)
    }

    fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        match self.db.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn fetch_all(&self) -> Result<Vec<Review>, StoreError> {
        let mut reviews = Vec::new();
        for entry in self.db.iter() {
            let (_, bytes) = entry?;
            reviews.push(bincode::deserialize(&bytes)?);
        }
        Ok(reviews)
    }

    fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, StoreError> {
        Ok(apply_query(self.fetch_all()?, query))
    }
}

/// In-memory store for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    reviews: RwLock<Vec<Review>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewStore for MemoryStore {
    fn create(&self, review: NewReview) -> Result<Review, StoreError> {
        let mut reviews = self.reviews.write();
        let stored = Review {
            id: reviews.len() as ReviewId,
            location: review.location,
            rating: review.rating,
            text: review.text,
            date: review.date,
        };
        reviews.push(stored.clone());
        Ok(stored)
    }

    fn get(&self, id: ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.reviews.read().iter().find(|r| r.id == id).cloned())
    }

    fn fetch_all(&self) -> Result<Vec<Review>, StoreError> {
        Ok(self.reviews.read().clone())
    }

    fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, StoreError> {
        Ok(apply_query(self.fetch_all()?, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(location: &str, rating: u8, text: &str) -> NewReview {
        NewReview {
            location: location.into(),
            rating,
            text: text.into(),
            date: "2024-03-01".into(),
        }
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.create(sample("downtown", 5, "Great service and friendly staff")).unwrap();
        store.create(sample("airport", 2, "The food was cold")).unwrap();
        store.create(sample("downtown", 4, "Clean rooms, fair price")).unwrap();
        store
    }

    #[test]
    fn fetch_all_preserves_insertion_order() {
        let store = seeded();
        let all = store.fetch_all().unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn list_filters_by_location() {
        let store = seeded();
        let query = ReviewQuery { location: Some("downtown".into()), ..Default::default() };
        let hits = store.list(&query).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|r| r.location == "downtown"));
    }

    #[test]
    fn list_text_filter_is_case_insensitive() {
        let store = seeded();
        let query = ReviewQuery { q: Some("FRIENDLY".into()), ..Default::default() };
        let hits = store.list(&query).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 0);
    }

    #[test]
    fn list_paginates_with_skip_and_limit() {
        let store = seeded();
        let query = ReviewQuery { skip: 1, limit: Some(1), ..Default::default() };
        let hits = store.list(&query).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn sled_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(&StoreConfig::new(dir.path())).unwrap();
        let created = store.create(sample("downtown", 3, "Average visit")).unwrap();
        let fetched = store.get(created.id).unwrap().unwrap();
        assert_eq!(fetched.text, "Average visit");
        assert_eq!(store.get(created.id + 1).unwrap().map(|r| r.id), None);
        assert_eq!(store.fetch_all().unwrap().len(), 1);
    }
}
