//! User-based collaborative filtering.
//!
//! Predicts a user's rating of an item from how other users rated it,
//! weighting each of them by how closely their past ratings track the
//! target user's, then measures the error against the known rating.
//!
//! # Architecture
//!
//! - **similarity**: Pearson correlation over co-rated items, target item excluded
//! - **neighbors**: usability policy, ascending `(sample_size, coefficient)` ranking, limit
//! - **prediction**: similarity-weighted average, inverted scale for negative weights
//! - **accuracy**: RMSE over the predicted results
//! - **engine**: per-record orchestration and concurrent batch runs
//!
//! # Usage
//!
//! ```rust,no_run
//! use cofilter_core::{CollaborativeFilter, FilteringConfig, InMemoryRatingStore, Rating, RecordFilter};
//! use std::sync::Arc;
//!
//! # async fn example() -> cofilter_core::Result<()> {
//! let store = Arc::new(InMemoryRatingStore::with_ratings(vec![
//!     Rating::new("alice", "cafe", 5)?,
//!     Rating::new("bob", "cafe", 4)?,
//! ]));
//! let filter = CollaborativeFilter::new(store, FilteringConfig::default());
//! let report = filter.run(&RecordFilter::All).await?;
//! println!("{}", report.accuracy);
//! # Ok(())
//! # }
//! ```

pub mod accuracy;
pub mod engine;
pub mod neighbors;
pub mod prediction;
pub mod similarity;

pub use accuracy::evaluate;
pub use engine::{BatchReport, CollaborativeFilter};
pub use neighbors::{compare_similarity, NeighborSelector, Selection, UsabilityPolicy};
pub use prediction::weighted_prediction;
pub use similarity::{similarity, similarity_with_min_common};
