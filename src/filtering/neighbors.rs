//! Neighbor usability policy and ranking
//!
//! Ranking is ascending by `(sample_size, coefficient)` and the prediction
//! engine consumes the ranked list from the front, so the least similar
//! usable neighbors are aggregated first. This matches the behavior the
//! evaluation results were produced with; changing it changes every RMSE.

use crate::config::FilteringConfig;
use crate::types::{Neighbor, SimilarityScore};
use std::cmp::Ordering;

/// Threshold and sign rules deciding whether a similarity is strong enough
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsabilityPolicy {
    pub min_threshold: f64,
    pub reject_negative: bool,
}

impl Default for UsabilityPolicy {
    fn default() -> Self {
        Self::from(&FilteringConfig::default())
    }
}

impl From<&FilteringConfig> for UsabilityPolicy {
    fn from(config: &FilteringConfig) -> Self {
        Self {
            min_threshold: config.min_pcc_threshold,
            reject_negative: config.reject_negative,
        }
    }
}

impl UsabilityPolicy {
    /// A score is usable when present, non-zero, of an accepted sign, and at
    /// or above the threshold
    pub fn is_usable(&self, score: Option<&SimilarityScore>) -> bool {
        let Some(score) = score else {
            return false;
        };
        let coefficient = score.coefficient();
        if coefficient == 0.0 {
            return false;
        }
        if self.reject_negative && coefficient < 0.0 {
            return false;
        }
        coefficient >= self.min_threshold
    }
}

/// Ordering of similarity scores: by sample size, then by coefficient
pub fn compare_similarity(a: &SimilarityScore, b: &SimilarityScore) -> Ordering {
    a.sample_size()
        .cmp(&b.sample_size())
        .then_with(|| a.coefficient().total_cmp(&b.coefficient()))
}

/// Neighbors ranked for aggregation with the number to use
///
/// `neighbors` keeps every usable candidate in rank order because the
/// prediction engine may read one element past `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub neighbors: Vec<Neighbor>,
    pub limit: usize,
}

impl Selection {
    /// The bounded neighbor set, at most `max_sample` long
    pub fn selected(&self) -> &[Neighbor] {
        &self.neighbors[..self.limit]
    }
}

/// Filters, ranks and bounds the neighbor set of one prediction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeighborSelector {
    policy: UsabilityPolicy,
    max_sample: usize,
}

impl Default for NeighborSelector {
    fn default() -> Self {
        Self::from(&FilteringConfig::default())
    }
}

impl From<&FilteringConfig> for NeighborSelector {
    fn from(config: &FilteringConfig) -> Self {
        Self::new(UsabilityPolicy::from(config), config.max_sample)
    }
}

impl NeighborSelector {
    pub fn new(policy: UsabilityPolicy, max_sample: usize) -> Self {
        Self { policy, max_sample }
    }

    pub fn policy(&self) -> &UsabilityPolicy {
        &self.policy
    }

    /// Drop unusable candidates, sort the rest ascending, and compute the limit
    ///
    /// The sort is stable: candidates with equal scores keep store order.
    pub fn select(&self, candidates: Vec<Neighbor>) -> Selection {
        let mut neighbors: Vec<Neighbor> = candidates
            .into_iter()
            .filter(|neighbor| self.policy.is_usable(Some(&neighbor.similarity)))
            .collect();

        neighbors.sort_by(|a, b| compare_similarity(&a.similarity, &b.similarity));
        let limit = neighbors.len().min(self.max_sample);

        Selection { neighbors, limit }
    }
}
