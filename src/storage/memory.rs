//! In-memory rating store
//!
//! Keeps records in insertion order with user and item indexes. Used for
//! tests, benchmarks and small review files that fit in memory.

use crate::error::Result;
use crate::storage::{RatingStore, RecordFilter};
use crate::types::{Rating, RatingRecord, UserHistory};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<RatingRecord>,
    by_user: HashMap<String, Vec<usize>>,
    by_item: HashMap<String, Vec<usize>>,
}

impl Inner {
    fn push(&mut self, record: RatingRecord) {
        let position = self.records.len();
        if let Some(user_id) = &record.user_id {
            self.by_user.entry(user_id.clone()).or_default().push(position);
        }
        if let Some(item_id) = &record.item_id {
            self.by_item.entry(item_id.clone()).or_default().push(position);
        }
        self.records.push(record);
    }

    fn valid_at<'a>(&'a self, positions: Option<&'a Vec<usize>>) -> impl Iterator<Item = Rating> + 'a {
        positions
            .into_iter()
            .flatten()
            .filter_map(move |&position| self.records[position].validate().ok())
    }
}

/// Rating store backed by indexed in-process collections
#[derive(Debug, Default)]
pub struct InMemoryRatingStore {
    inner: RwLock<Inner>,
}

impl InMemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with validated ratings
    pub fn with_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let mut inner = Inner::default();
        for rating in ratings {
            inner.push(rating.into());
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl RatingStore for InMemoryRatingStore {
    async fn ratings_by_user(&self, user_id: &str) -> Result<UserHistory> {
        let inner = self.inner.read().await;
        Ok(UserHistory::from_ratings(inner.valid_at(inner.by_user.get(user_id))))
    }

    async fn ratings_by_item(&self, item_id: &str) -> Result<Vec<Rating>> {
        let inner = self.inner.read().await;
        Ok(inner.valid_at(inner.by_item.get(item_id)).collect())
    }

    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<RatingRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn store_records(&self, records: &[RatingRecord]) -> Result<usize> {
        let mut inner = self.inner.write().await;
        for record in records {
            inner.push(record.clone());
        }
        debug!("Stored {} records in memory", records.len());
        Ok(records.len())
    }

    async fn count_records(&self) -> Result<usize> {
        Ok(self.inner.read().await.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookups_by_user_and_item() {
        let store = InMemoryRatingStore::new();
        store
            .store_records(&[
                RatingRecord::new("u1", "b1", 5),
                RatingRecord::new("u1", "b2", 3),
                RatingRecord::new("u2", "b1", 4),
                RatingRecord {
                    user_id: Some("u3".into()),
                    item_id: Some("b1".into()),
                    stars: None,
                },
            ])
            .await
            .unwrap();

        let history = store.ratings_by_user("u1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.stars("b2"), Some(3));

        // Malformed rows are invisible to lookups but still counted as records
        let raters = store.ratings_by_item("b1").await.unwrap();
        assert_eq!(raters.len(), 2);
        assert_eq!(store.count_records().await.unwrap(), 4);

        let all = store.find_records(&RecordFilter::All).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], RatingRecord::new("u1", "b1", 5));
    }

    #[tokio::test]
    async fn test_unknown_ids_return_empty() {
        let store = InMemoryRatingStore::with_ratings(vec![Rating::new("u1", "b1", 2).unwrap()]);
        assert!(store.ratings_by_user("nobody").await.unwrap().is_empty());
        assert!(store.ratings_by_item("nothing").await.unwrap().is_empty());
    }
}
