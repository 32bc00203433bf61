//! Storage layer for rating records
//!
//! The predictor only needs two lookups: every rating of a user (keyed by
//! item) and every rating of an item. Any engine answering those, plus the
//! bulk record operations used by import and batch selection, can back it.

pub mod cache;
pub mod libsql;
pub mod memory;

use crate::error::Result;
use crate::types::{Rating, RatingRecord, UserHistory};
use async_trait::async_trait;

/// Rating store trait defining all required operations
///
/// Implementations must be safe for concurrent reads; predictions for
/// different records run in parallel against the same store.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// All well-formed ratings by a user, keyed by item id
    async fn ratings_by_user(&self, user_id: &str) -> Result<UserHistory>;

    /// All well-formed ratings of an item
    async fn ratings_by_item(&self, item_id: &str) -> Result<Vec<Rating>>;

    /// Raw records matching a filter, malformed ones included, in store order
    async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<RatingRecord>>;

    /// Append records; returns how many were stored
    async fn store_records(&self, records: &[RatingRecord]) -> Result<usize>;

    /// Total number of stored records
    async fn count_records(&self) -> Result<usize>;
}

/// Selection of records for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordFilter {
    /// Every stored record
    #[default]
    All,
    /// Records written by one user
    User(String),
    /// Records of one item
    Item(String),
    /// The rating(s) of one item by one user
    Pair { user_id: String, item_id: String },
}

impl RecordFilter {
    /// Build a filter from optional user and item constraints
    pub fn from_parts(user_id: Option<String>, item_id: Option<String>) -> Self {
        match (user_id, item_id) {
            (Some(user_id), Some(item_id)) => RecordFilter::Pair { user_id, item_id },
            (Some(user_id), None) => RecordFilter::User(user_id),
            (None, Some(item_id)) => RecordFilter::Item(item_id),
            (None, None) => RecordFilter::All,
        }
    }

    /// Whether a raw record is selected by this filter
    pub fn matches(&self, record: &RatingRecord) -> bool {
        let user = record.user_id.as_deref();
        let item = record.item_id.as_deref();
        match self {
            RecordFilter::All => true,
            RecordFilter::User(user_id) => user == Some(user_id.as_str()),
            RecordFilter::Item(item_id) => item == Some(item_id.as_str()),
            RecordFilter::Pair { user_id, item_id } => {
                user == Some(user_id.as_str()) && item == Some(item_id.as_str())
            }
        }
    }
}

impl std::fmt::Display for RecordFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordFilter::All => write!(f, "all"),
            RecordFilter::User(user_id) => write!(f, "user:{}", user_id),
            RecordFilter::Item(item_id) => write!(f, "item:{}", item_id),
            RecordFilter::Pair { user_id, item_id } => write!(f, "pair:{}/{}", user_id, item_id),
        }
    }
}
