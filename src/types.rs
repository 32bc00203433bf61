//! Core data types for the cofilter rating predictor
//!
//! This module defines the value types that flow through a prediction:
//! raw records as read from a store, validated ratings, per-user rating
//! histories, similarity scores, neighbors and prediction results. All of
//! them are plain values scoped to a single prediction call.

use crate::error::{CofilterError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lowest star value a rating can carry
pub const MIN_STARS: u8 = 1;

/// Highest star value a rating can carry
pub const MAX_STARS: u8 = 5;

/// A validated rating of one item by one user
///
/// Identity is `(user_id, item_id)`. Construct through [`Rating::new`] or
/// [`RatingRecord::validate`] so the star range is always checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: String,
    pub item_id: String,
    pub stars: u8,
}

impl Rating {
    /// Create a rating, rejecting empty ids and stars outside `[1, 5]`
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, stars: i64) -> Result<Self> {
        RatingRecord::new(user_id, item_id, stars).validate()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user={} item={} stars={}", self.user_id, self.item_id, self.stars)
    }
}

/// A rating record as stored, before validation
///
/// Every field is optional because import files and stored rows are not
/// guaranteed to be complete. Import files use the Yelp review layout, so
/// `business_id` is accepted as an alias for `item_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, alias = "business_id")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_stars")]
    pub stars: Option<i64>,
}

impl RatingRecord {
    /// Create a fully populated record
    pub fn new(user_id: impl Into<String>, item_id: impl Into<String>, stars: i64) -> Self {
        Self {
            user_id: Some(user_id.into()),
            item_id: Some(item_id.into()),
            stars: Some(stars),
        }
    }

    /// Check required fields and the star range, producing a [`Rating`]
    pub fn validate(&self) -> Result<Rating> {
        let user_id = match self.user_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => return Err(CofilterError::MalformedRecord("missing user_id".to_string())),
        };
        let item_id = match self.item_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => return Err(CofilterError::MalformedRecord("missing item_id".to_string())),
        };
        let stars = self
            .stars
            .ok_or_else(|| CofilterError::MalformedRecord("missing stars".to_string()))?;

        if !(i64::from(MIN_STARS)..=i64::from(MAX_STARS)).contains(&stars) {
            return Err(CofilterError::MalformedRecord(format!(
                "stars {} outside [{}, {}]",
                stars, MIN_STARS, MAX_STARS
            )));
        }

        Ok(Rating {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
            stars: stars as u8,
        })
    }
}

impl From<Rating> for RatingRecord {
    fn from(rating: Rating) -> Self {
        Self {
            user_id: Some(rating.user_id),
            item_id: Some(rating.item_id),
            stars: Some(i64::from(rating.stars)),
        }
    }
}

/// Accept integer stars as well as integral floats (`4.0`)
fn deserialize_stars<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<f64>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) if value.fract() == 0.0 => Ok(Some(value as i64)),
        Some(value) => Err(serde::de::Error::custom(format!(
            "stars must be a whole number, got {}",
            value
        ))),
    }
}

/// All ratings of a single user, keyed by item id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserHistory {
    ratings: HashMap<String, Rating>,
}

impl UserHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history; a later rating of the same item replaces an earlier one
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Self {
        let mut history = Self::new();
        for rating in ratings {
            history.insert(rating);
        }
        history
    }

    pub fn insert(&mut self, rating: Rating) {
        self.ratings.insert(rating.item_id.clone(), rating);
    }

    pub fn get(&self, item_id: &str) -> Option<&Rating> {
        self.ratings.get(item_id)
    }

    /// Star value this user gave the item, if rated
    pub fn stars(&self, item_id: &str) -> Option<u8> {
        self.ratings.get(item_id).map(|r| r.stars)
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.ratings.contains_key(item_id)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &str> {
        self.ratings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rating> {
        self.ratings.values()
    }
}

/// Pearson correlation between two users over their co-rated items
///
/// Only the similarity engine creates these, and only when at least two
/// items overlap and neither side has zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityScore {
    coefficient: f64,
    sample_size: usize,
}

impl SimilarityScore {
    pub(crate) fn new(coefficient: f64, sample_size: usize) -> Self {
        Self {
            coefficient,
            sample_size,
        }
    }

    /// Pearson correlation coefficient in `[-1, 1]`
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Number of co-rated items the coefficient was computed from
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }
}

impl fmt::Display for SimilarityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.coefficient, self.sample_size)
    }
}

/// Another user's rating of the target item, annotated with their similarity
/// to the target user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    pub rater_id: String,
    pub stars: u8,
    pub similarity: SimilarityScore,
}

impl fmt::Display for Neighbor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rater={} stars={} similarity={}",
            self.rater_id, self.stars, self.similarity
        )
    }
}

/// Outcome of predicting one stored rating
///
/// `predicted_stars` is `None` when no usable neighbor contributed; such a
/// result is reported as insufficient data and excluded from accuracy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub user_id: String,
    pub item_id: String,
    pub actual_stars: u8,
    /// Neighbors that passed the usability filter
    pub total_candidate_count: usize,
    /// Neighbor limit applied when aggregating
    pub used_count: usize,
    pub predicted_stars: Option<f64>,
}

impl PredictionResult {
    pub fn has_prediction(&self) -> bool {
        self.predicted_stars.is_some()
    }

    /// Signed error `predicted - actual`, if a prediction exists
    pub fn error(&self) -> Option<f64> {
        self.predicted_stars
            .map(|predicted| predicted - f64::from(self.actual_stars))
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let predicted = match self.predicted_stars {
            Some(p) => format!("{:.4}", p),
            None => "none".to_string(),
        };
        write!(
            f,
            "user={} item={} stars={} predicted={} candidates={} used={}",
            self.user_id,
            self.item_id,
            self.actual_stars,
            predicted,
            self.total_candidate_count,
            self.used_count
        )
    }
}

/// Aggregate accuracy of a batch of predictions
///
/// Serializes as `{"count":0}` when no prediction was available.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rms: Option<f64>,
}

impl AccuracyReport {
    pub fn empty() -> Self {
        Self { count: 0, rms: None }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for AccuracyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rms {
            Some(rms) => write!(f, "RMS({}) = {}", self.count, rms),
            None => write!(f, "RMS({})", self.count),
        }
    }
}
