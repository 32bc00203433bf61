//! Per-run read-through cache of user histories
//!
//! A batch run asks for the same rater's history once per item they rated.
//! The cache trades memory for those repeated lookups. It lives for one run,
//! entries are written once and never invalidated, and concurrent callers
//! racing on a missing key may both query the store: the first insert wins.

use crate::error::Result;
use crate::storage::RatingStore;
use crate::types::UserHistory;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Cache of user histories keyed by user id
#[derive(Debug, Default)]
pub struct UserHistoryCache {
    entries: RwLock<HashMap<String, Arc<UserHistory>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Hit/miss counters for a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl UserHistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached history for a user, if present
    pub async fn get(&self, user_id: &str) -> Option<Arc<UserHistory>> {
        self.entries.read().await.get(user_id).cloned()
    }

    /// Insert a history unless one is already cached; returns the cached value
    pub async fn insert(&self, user_id: &str, history: UserHistory) -> Arc<UserHistory> {
        let mut entries = self.entries.write().await;
        entries
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(history))
            .clone()
    }

    /// Return the cached history or load it from the store
    pub async fn get_or_load(
        &self,
        store: &dyn RatingStore,
        user_id: &str,
    ) -> Result<Arc<UserHistory>> {
        if let Some(history) = self.get(user_id).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(history);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        // Lock is not held across the store query
        let history = store.ratings_by_user(user_id).await?;
        debug!("Caching {} ratings for user {}", history.len(), user_id);
        Ok(self.insert(user_id, history).await)
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
