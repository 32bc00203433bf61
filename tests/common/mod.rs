//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use cofilter_core::{
    error::{CofilterError, Result},
    InMemoryRatingStore, LibsqlRatingStore, Rating, RatingRecord, RatingStore, RecordFilter,
    UserHistory,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Build validated ratings from `(user, item, stars)` triples
pub fn ratings(triples: &[(&str, &str, i64)]) -> Vec<Rating> {
    triples
        .iter()
        .map(|&(user, item, stars)| Rating::new(user, item, stars).expect("valid test rating"))
        .collect()
}

/// Create an in-memory store holding the given ratings
pub fn memory_store(triples: &[(&str, &str, i64)]) -> Arc<InMemoryRatingStore> {
    Arc::new(InMemoryRatingStore::with_ratings(ratings(triples)))
}

/// Create a LibSQL store in a fresh temporary directory
///
/// The directory must outlive the store, so it is returned alongside it.
pub async fn create_test_storage() -> (LibsqlRatingStore, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("ratings.db");
    let store = LibsqlRatingStore::open(&path.to_string_lossy(), true)
        .await
        .expect("Failed to create test storage");
    (store, dir)
}

/// Ratings of a small neighborhood around user "U" and item "T"
///
/// "U" rated a, b, c as 1, 2, 3. Nine raters agree with U on a and b only
/// (coefficient 1.0 over 2 items) and gave T a 1. One rater agrees with U on
/// a, b and c (coefficient 1.0 over 3 items) and gave T a 5.
pub fn neighborhood(agreeing_on_two: usize) -> Vec<(String, String, i64)> {
    let mut triples = vec![
        ("U".to_string(), "a".to_string(), 1),
        ("U".to_string(), "b".to_string(), 2),
        ("U".to_string(), "c".to_string(), 3),
        ("U".to_string(), "T".to_string(), 4),
    ];
    for i in 0..agreeing_on_two {
        let rater = format!("two{}", i);
        triples.push((rater.clone(), "a".to_string(), 1));
        triples.push((rater.clone(), "b".to_string(), 2));
        triples.push((rater, "T".to_string(), 1));
    }
    triples.push(("three".to_string(), "a".to_string(), 1));
    triples.push(("three".to_string(), "b".to_string(), 2));
    triples.push(("three".to_string(), "c".to_string(), 3));
    triples.push(("three".to_string(), "T".to_string(), 5));
    triples
}

/// Store built from owned triples
pub fn memory_store_owned(triples: &[(String, String, i64)]) -> Arc<InMemoryRatingStore> {
    let borrowed: Vec<(&str, &str, i64)> = triples
        .iter()
        .map(|(user, item, stars)| (user.as_str(), item.as_str(), *stars))
        .collect();
    memory_store(&borrowed)
}

/// Store whose lookups fail, standing in for an unreachable database
pub struct UnavailableStore {
    pub records: Vec<RatingRecord>,
    lookups: AtomicUsize,
}

impl UnavailableStore {
    pub fn new(records: Vec<RatingRecord>) -> Self {
        Self {
            records,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Number of failed lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RatingStore for UnavailableStore {
    async fn ratings_by_user(&self, _user_id: &str) -> Result<UserHistory> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(CofilterError::StoreUnavailable("connection reset".to_string()))
    }

    async fn ratings_by_item(&self, _item_id: &str) -> Result<Vec<Rating>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(CofilterError::StoreUnavailable("connection reset".to_string()))
    }

    async fn find_records(&self, _filter: &RecordFilter) -> Result<Vec<RatingRecord>> {
        Ok(self.records.clone())
    }

    async fn store_records(&self, _records: &[RatingRecord]) -> Result<usize> {
        Err(CofilterError::StoreUnavailable("read-only".to_string()))
    }

    async fn count_records(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
