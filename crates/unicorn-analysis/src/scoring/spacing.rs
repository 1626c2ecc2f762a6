//! Minimum relative spacing between consecutive scores of one pattern.

use unicorn_core::types::ScoredResult;

/// Force each positive-predecessor score at least `gap` (relative) below
/// the previous one. `results` must already be in rank order; the order is
/// preserved. `z_adjusted` is scaled together with the score. A gap of 0
/// leaves the list untouched.
pub fn apply_min_score_spacing(results: &mut [ScoredResult], gap: f64) {
    if !(gap > 0.0 && gap < 1.0) {
        return;
    }
    for i in 1..results.len() {
        let prev = results[i - 1].score;
        let current = &mut results[i];
        if prev > 0.0 && prev - current.score < gap * prev {
            let spaced = prev * (1.0 - gap);
            if current.score != 0.0 {
                current.z_adjusted *= spaced / current.score;
            }
            current.score = spaced;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use unicorn_core::types::EntityType;

    fn result(entity_id: i64, score: f64) -> ScoredResult {
        ScoredResult {
            run_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            pattern_id: "UNQ-T".into(),
            entity_type: EntityType::Batter,
            entity_id,
            rank: 0,
            metric_value: 0.0,
            sample_size: 10,
            z_raw: score,
            z_adjusted: score,
            score,
        }
    }

    #[test]
    fn test_plateau_is_spread() {
        let mut rows = vec![result(1, 2.0), result(2, 2.0), result(3, 1.995)];
        apply_min_score_spacing(&mut rows, 0.01);
        assert_eq!(rows[0].score, 2.0);
        assert!((rows[1].score - 1.98).abs() < 1e-12);
        assert!((rows[2].score - 1.98 * 0.99).abs() < 1e-12);
        assert!((rows[1].z_adjusted - 1.98).abs() < 1e-12);
    }

    #[test]
    fn test_disabled_and_non_positive() {
        let mut rows = vec![result(1, 1.0), result(2, 1.0)];
        apply_min_score_spacing(&mut rows, 0.0);
        assert_eq!(rows[1].score, 1.0);

        let mut rows = vec![result(1, -1.0), result(2, -1.0)];
        apply_min_score_spacing(&mut rows, 0.01);
        assert_eq!(rows[1].score, -1.0);
    }
}
