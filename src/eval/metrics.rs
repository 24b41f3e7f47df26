//! Per-group ranking metrics: Recall@K, Manual Effort@K, and reciprocal rank.
//!
//! Every function takes the sorted, 1-indexed ranks of a group's positive
//! candidates. A rank counts as "within k" only when it is strictly below k.

use std::cmp::Ordering;

/// Recall at K for one group: fraction of positives ranked strictly below k.
/// Returns (positives with rank < k) / |positive_ranks|. A group without
/// positives returns 0.0.
pub fn recall_at_k(positive_ranks: &[usize], k: usize) -> f64 {
    if positive_ranks.is_empty() {
        return 0.0;
    }
    let top_k_counts = positive_ranks.iter().filter(|&&rank| rank < k).count();
    top_k_counts as f64 / positive_ranks.len() as f64
}

/// Manual effort at K for one group: the best positive rank strictly below k.
/// Falls back to k itself when no positive ranks below k, including groups
/// without any positive.
pub fn manual_effort_at_k(positive_ranks: &[usize], k: usize) -> usize {
    positive_ranks
        .iter()
        .copied()
        .filter(|&rank| rank < k)
        .min()
        .unwrap_or(k)
}

/// Mean of 1/rank over all positives of one group; 0.0 without positives.
pub fn mean_reciprocal_rank(positive_ranks: &[usize]) -> f64 {
    if positive_ranks.is_empty() {
        return 0.0;
    }
    let sum: f64 = positive_ranks.iter().map(|&rank| 1.0 / rank as f64).sum();
    sum / positive_ranks.len() as f64
}

/// Unweighted mean; `None` for an empty slice so callers pick their own default.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Descending score order used for ranking.
///
/// Numerically equal scores compare `Equal` (so `-0.0` ties with `0.0`) and
/// keep insertion order under a stable sort. NaN falls back to IEEE total
/// order: a positive NaN sorts ahead of every number, a negative NaN after.
pub(crate) fn descending_score(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| b.total_cmp(&a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recall_excludes_rank_equal_to_k() {
        assert_eq!(recall_at_k(&[3], 3), 0.0);
        assert!((recall_at_k(&[3], 4) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recall_partial() {
        assert!((recall_at_k(&[1, 5], 3) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recall_no_positives() {
        assert_eq!(recall_at_k(&[], 10), 0.0);
    }

    #[test]
    fn manual_effort_best_rank_below_k() {
        assert_eq!(manual_effort_at_k(&[2], 5), 2);
        assert_eq!(manual_effort_at_k(&[2, 4], 5), 2);
    }

    #[test]
    fn manual_effort_falls_back_to_k() {
        // 2 < 2 is false, so the fallback applies
        assert_eq!(manual_effort_at_k(&[2], 2), 2);
        assert_eq!(manual_effort_at_k(&[7, 9], 3), 3);
    }

    #[test]
    fn manual_effort_no_positives_is_k() {
        for k in [1, 2, 10, 100] {
            assert_eq!(manual_effort_at_k(&[], k), k);
        }
    }

    #[test]
    fn mrr_averages_all_positives() {
        assert!((mean_reciprocal_rank(&[1, 4]) - 0.625).abs() < 1e-9);
    }

    #[test]
    fn mrr_no_positives() {
        assert_eq!(mean_reciprocal_rank(&[]), 0.0);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0]), Some(1.5));
    }

    #[test]
    fn descending_score_orders_high_first() {
        assert_eq!(descending_score(0.9, 0.1), Ordering::Less);
        assert_eq!(descending_score(0.1, 0.9), Ordering::Greater);
        assert_eq!(descending_score(-0.0, 0.0), Ordering::Equal);
        assert_eq!(descending_score(f64::NAN, 1.0), Ordering::Less);
    }
}
