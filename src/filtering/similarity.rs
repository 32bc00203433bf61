//! Pearson similarity between two users' rating histories
//!
//! The coefficient is computed over the items both users rated, minus the
//! item being predicted, so the rating under test never feeds its own
//! similarity signal. See
//! <http://en.wikipedia.org/wiki/Pearson_correlation_coefficient>.

use crate::config::MIN_COMMON;
use crate::types::{SimilarityScore, UserHistory};

/// Similarity of two users, or `None` when it is undefined
///
/// Undefined means fewer than [`MIN_COMMON`] co-rated items remain after
/// excluding `exclude_item`, or one side rated every co-rated item the same.
pub fn similarity(
    history_a: &UserHistory,
    history_b: &UserHistory,
    exclude_item: &str,
) -> Option<SimilarityScore> {
    similarity_with_min_common(history_a, history_b, exclude_item, MIN_COMMON)
}

/// Like [`similarity`], with a stricter minimum overlap
///
/// `min_common` below [`MIN_COMMON`] is raised to it; Pearson needs two points.
pub fn similarity_with_min_common(
    history_a: &UserHistory,
    history_b: &UserHistory,
    exclude_item: &str,
    min_common: usize,
) -> Option<SimilarityScore> {
    let mut common: Vec<(&str, f64, f64)> = history_a
        .iter()
        .filter(|rating| rating.item_id != exclude_item)
        .filter_map(|rating| {
            history_b.stars(&rating.item_id).map(|other| {
                (
                    rating.item_id.as_str(),
                    f64::from(rating.stars),
                    f64::from(other),
                )
            })
        })
        .collect();

    let count = common.len();
    if count < min_common.max(MIN_COMMON) {
        return None;
    }

    // Item order fixes the summation order, keeping the result symmetric
    common.sort_unstable_by(|a, b| a.0.cmp(b.0));

    let n = count as f64;
    let mean_x = common.iter().map(|&(_, x, _)| x).sum::<f64>() / n;
    let mean_y = common.iter().map(|&(_, _, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for &(_, x, y) in &common {
        let delta_x = x - mean_x;
        let delta_y = y - mean_y;
        covariance += delta_x * delta_y;
        variance_x += delta_x * delta_x;
        variance_y += delta_y * delta_y;
    }

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }

    let coefficient = covariance / (variance_x.sqrt() * variance_y.sqrt());
    Some(SimilarityScore::new(coefficient, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rating;

    fn history(user: &str, ratings: &[(&str, i64)]) -> UserHistory {
        UserHistory::from_ratings(
            ratings
                .iter()
                .map(|&(item, stars)| Rating::new(user, item, stars).unwrap()),
        )
    }

    #[test]
    fn test_two_point_perfect_correlation() {
        let u = history("U", &[("A", 5), ("B", 4), ("C", 2)]);
        let v = history("V", &[("A", 5), ("B", 4), ("D", 1)]);

        let score = similarity(&u, &v, "D").unwrap();
        assert!((score.coefficient() - 1.0).abs() < 1e-12);
        assert_eq!(score.sample_size(), 2);
    }

    #[test]
    fn test_excluded_item_does_not_count() {
        let u = history("U", &[("A", 5), ("B", 4), ("T", 1)]);
        let v = history("V", &[("A", 5), ("B", 4)]);

        assert_eq!(similarity(&u, &v, "T").unwrap().sample_size(), 2);
        // A and B are the only shared items; excluding A leaves one
        assert!(similarity(&u, &v, "A").is_none());
    }

    #[test]
    fn test_single_overlap_is_undefined() {
        let u = history("U", &[("A", 5), ("B", 4)]);
        let v = history("V", &[("A", 3), ("C", 4)]);
        assert!(similarity(&u, &v, "none").is_none());
    }

    #[test]
    fn test_zero_variance_is_undefined() {
        let u = history("U", &[("A", 3), ("B", 3), ("C", 3)]);
        let v = history("V", &[("A", 3), ("B", 3), ("C", 3)]);
        assert!(similarity(&u, &v, "none").is_none());

        // Only one side constant is still undefined
        let w = history("W", &[("A", 1), ("B", 4), ("C", 5)]);
        assert!(similarity(&u, &w, "none").is_none());
        assert!(similarity(&w, &u, "none").is_none());
    }

    #[test]
    fn test_negative_and_partial_correlation() {
        let u = history("U", &[("A", 1), ("B", 2), ("C", 3)]);
        let inverse = history("V", &[("A", 3), ("B", 2), ("C", 1)]);
        let partial = history("W", &[("A", 1), ("B", 3), ("C", 2)]);

        let score = similarity(&u, &inverse, "none").unwrap();
        assert!((score.coefficient() + 1.0).abs() < 1e-12);

        let score = similarity(&u, &partial, "none").unwrap();
        assert!((score.coefficient() - 0.5).abs() < 1e-12);
        assert_eq!(score.sample_size(), 3);
    }

    #[test]
    fn test_symmetry() {
        let u = history("U", &[("A", 1), ("B", 5), ("C", 2), ("D", 4)]);
        let v = history("V", &[("A", 2), ("B", 4), ("C", 3), ("E", 1)]);
        assert_eq!(similarity(&u, &v, "X"), similarity(&v, &u, "X"));
    }

    #[test]
    fn test_stricter_min_common() {
        let u = history("U", &[("A", 1), ("B", 2), ("C", 3)]);
        let v = history("V", &[("A", 1), ("B", 2), ("C", 3)]);
        assert!(similarity_with_min_common(&u, &v, "none", 3).is_some());
        assert!(similarity_with_min_common(&u, &v, "none", 4).is_none());
        // Cannot go below two points
        let w = history("W", &[("A", 1)]);
        assert!(similarity_with_min_common(&u, &w, "none", 0).is_none());
    }
}
