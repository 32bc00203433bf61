//! Cofilter - User-Based Collaborative Filtering
//!
//! Predicts how a user would rate an item from the ratings other users gave
//! it, weighting each rater by the Pearson correlation of their rating
//! history with the user's, and reports the root-mean-square error of those
//! predictions against the ratings actually given.
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (Rating, UserHistory, PredictionResult, etc.)
//! - **Storage**: Rating stores (libSQL, in-memory) and the per-run history cache
//! - **Filtering**: Similarity, neighbor selection, prediction and accuracy
//! - **Import**: Loading JSON-lines review dumps into a store

pub mod config;
pub mod error;
pub mod filtering;
pub mod import;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::FilteringConfig;
pub use error::{CofilterError, Result};
pub use filtering::{BatchReport, CollaborativeFilter};
pub use storage::{
    cache::UserHistoryCache, libsql::LibsqlRatingStore, memory::InMemoryRatingStore, RatingStore,
    RecordFilter,
};
pub use types::{
    AccuracyReport, Neighbor, PredictionResult, Rating, RatingRecord, SimilarityScore, UserHistory,
};
