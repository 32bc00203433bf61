//! Similarity-weighted aggregation of neighbor ratings

use crate::types::{Neighbor, MAX_STARS, MIN_STARS};

/// Weighted average of neighbor stars, or `None` when nobody contributed
///
/// Positive coefficients weight the neighbor's stars directly. Negative
/// coefficients weight the stars mirrored on the `[MIN_STARS, MAX_STARS]`
/// scale, so an anti-correlated neighbor's 5 reads as a 1. Zero coefficients
/// are skipped and do not count toward `limit`.
///
/// The walk stops once more than `limit` neighbors have contributed, so up to
/// `limit + 1` ranked neighbors are aggregated.
pub fn weighted_prediction(neighbors: &[Neighbor], limit: usize) -> Option<f64> {
    let mut total_stars = 0.0;
    let mut total_weight = 0.0;
    let mut contributed = 0usize;

    for neighbor in neighbors {
        if contributed > limit {
            break;
        }

        let coefficient = neighbor.similarity.coefficient();
        let stars = f64::from(neighbor.stars);
        if coefficient > 0.0 {
            total_weight += coefficient;
            total_stars += stars * coefficient;
            contributed += 1;
        } else if coefficient < 0.0 {
            let weight = -coefficient;
            total_weight += weight;
            total_stars += (f64::from(MAX_STARS) - stars + f64::from(MIN_STARS)) * weight;
            contributed += 1;
        }
    }

    if contributed == 0 {
        None
    } else {
        Some(total_stars / total_weight)
    }
}
