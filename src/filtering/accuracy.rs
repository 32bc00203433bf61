//! Root-mean-square error of a batch of predictions

use crate::types::{AccuracyReport, PredictionResult};

/// RMSE over the results that carry a prediction
///
/// Results without a prediction are ignored. With nothing to measure the
/// report is empty (`count == 0`, no `rms`) instead of NaN.
pub fn evaluate<'a>(results: impl IntoIterator<Item = &'a PredictionResult>) -> AccuracyReport {
    let (total_square, count) = results
        .into_iter()
        .filter_map(PredictionResult::error)
        .fold((0.0, 0usize), |(total, count), error| {
            (total + error * error, count + 1)
        });

    if count == 0 {
        return AccuracyReport::empty();
    }

    AccuracyReport {
        count,
        rms: Some((total_square / count as f64).sqrt()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(actual: u8, predicted: Option<f64>) -> PredictionResult {
        PredictionResult {
            user_id: "u".to_string(),
            item_id: "i".to_string(),
            actual_stars: actual,
            total_candidate_count: 1,
            used_count: 1,
            predicted_stars: predicted,
        }
    }

    #[test]
    fn test_rmse_of_mixed_errors() {
        let results = vec![
            result(4, Some(3.0)),
            result(3, Some(3.0)),
            result(5, Some(4.0)),
        ];
        let report = evaluate(&results);
        assert_eq!(report.count, 3);
        let expected = (2.0_f64 / 3.0).sqrt();
        assert!((report.rms.unwrap() - expected).abs() < 1e-12);
        assert!((report.rms.unwrap() - 0.8165).abs() < 1e-4);
    }

    #[test]
    fn test_perfect_predictions_have_zero_error() {
        let results = vec![result(4, Some(4.0)), result(1, Some(1.0))];
        let report = evaluate(&results);
        assert_eq!(report.rms, Some(0.0));
    }

    #[test]
    fn test_empty_batch_reports_no_data() {
        let report = evaluate(&Vec::<PredictionResult>::new());
        assert!(report.is_empty());
        assert_eq!(report.rms, None);
    }

    #[test]
    fn test_missing_predictions_are_ignored() {
        let results = vec![result(4, None), result(2, Some(4.0))];
        let report = evaluate(&results);
        assert_eq!(report.count, 1);
        assert_eq!(report.rms, Some(2.0));

        assert!(evaluate(&[result(3, None)]).is_empty());
    }
}
