//! Descriptive statistics used by the scorer.

use statrs::statistics::Statistics;

/// Fewer rows than this always use the rank-based fallback.
pub const MIN_ROWS_FOR_Z: usize = 3;

/// Mean and sample standard deviation of a metric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator); NaN when n < 2.
    pub std_dev: f64,
}

impl Summary {
    /// True when z-scores are meaningless for this column and ranks
    /// must be used instead.
    pub fn is_degenerate(&self) -> bool {
        self.n < MIN_ROWS_FOR_Z || !self.std_dev.is_finite() || self.std_dev <= 0.0
    }
}

/// `None` for an empty column.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }
    Some(Summary {
        n: values.len(),
        mean: values.iter().mean(),
        std_dev: values.iter().std_dev(),
    })
}

/// Linear rank position → `[0, 1]`: `position` 0 (best) maps to 1.0, the
/// last position to 0.0. A single row maps to 0.0.
pub fn rank_based_z(n: usize, position: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let last = (n - 1) as f64;
    (last - position.min(n - 1) as f64) / last
}

/// `sqrt(n / (n + target))`, or 1.0 when no target sample is set.
pub fn sample_weight(sample_size: u32, target_sample: u32) -> f64 {
    if target_sample == 0 {
        return 1.0;
    }
    let n = f64::from(sample_size);
    (n / (n + f64::from(target_sample))).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_summarize() {
        let s = summarize(&[12.0, 8.0, 4.0]).unwrap();
        assert_eq!(s.n, 3);
        assert!((s.mean - 8.0).abs() < 1e-12);
        assert!((s.std_dev - 4.0).abs() < 1e-12);
        assert!(!s.is_degenerate());
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_degenerate_columns() {
        assert!(summarize(&[5.0, 5.0, 5.0, 5.0]).unwrap().is_degenerate());
        assert!(summarize(&[1.0, 2.0]).unwrap().is_degenerate());
        assert!(summarize(&[1.0]).unwrap().is_degenerate());
    }

    #[test]
    fn test_rank_based_z_endpoints() {
        assert_eq!(rank_based_z(1, 0), 0.0);
        assert_eq!(rank_based_z(2, 0), 1.0);
        assert_eq!(rank_based_z(2, 1), 0.0);
        assert_eq!(rank_based_z(5, 2), 0.5);
    }

    #[test]
    fn test_sample_weight() {
        assert_eq!(sample_weight(7, 0), 1.0);
        assert!((sample_weight(50, 50) - 0.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(sample_weight(0, 10), 0.0);
    }

    proptest! {
        #[test]
        fn prop_rank_fallback_bounded_and_monotonic(n in 1usize..200) {
            let mut previous = f64::INFINITY;
            for position in 0..n {
                let z = rank_based_z(n, position);
                prop_assert!((0.0..=1.0).contains(&z));
                prop_assert!(z <= previous);
                previous = z;
            }
        }

        #[test]
        fn prop_sample_weight_monotonic_in_n(n in 0u32..10_000, target in 1u32..1_000) {
            let w = sample_weight(n, target);
            let w_next = sample_weight(n + 1, target);
            prop_assert!((0.0..1.0).contains(&w));
            prop_assert!(w_next > w);
        }
    }
}
