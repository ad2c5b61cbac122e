use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node is reported as pure.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let proportions = class_counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| c as f64 / n);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value.max(0.0))
    }
}

/// The chosen split for a node, with the partitioned sample indices.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n·I(parent) − n_l·I(left) − n_r·I(right)`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Best boundary found while scanning one feature.
struct Candidate {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

/// Find the best split over a random subset of features.
///
/// Features are visited in random order. Constant features (within the node)
/// do not count toward `max_features`, so the search keeps drawing until
/// `max_features` informative columns have been scanned or none are left.
///
/// `features` is column-major: `features[feature_idx][sample_idx]`.
/// Returns `None` when no boundary satisfies `min_samples_leaf`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = features.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples).value();

    let mut remaining: Vec<usize> = (0..n_features).collect();
    let mut visited_informative = 0usize;
    let mut best: Option<Candidate> = None;
    let mut column: Vec<(f64, usize)> = Vec::with_capacity(n_samples);

    while visited_informative < max_features && !remaining.is_empty() {
        let pick = rng.gen_range(0..remaining.len());
        let feat_idx = remaining.swap_remove(pick);

        let values = &features[feat_idx];
        column.clear();
        column.extend(sample_indices.iter().map(|&si| (values[si], labels[si])));
        column.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        if column[0].0 == column[n_samples - 1].0 {
            continue;
        }
        visited_informative += 1;

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.clone();
        for i in 0..(n_samples - 1) {
            let (value, class) = column[i];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next = column[i + 1].0;
            if value == next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n_samples - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let decrease = n_samples as f64 * parent_impurity
                - n_left as f64 * criterion.impurity(&left_counts, n_left).value()
                - n_right as f64 * criterion.impurity(&right_counts, n_right).value();

            if best.as_ref().is_none_or(|b| decrease > b.decrease) {
                best = Some(Candidate {
                    feature: feat_idx,
                    threshold: midpoint(value, next),
                    decrease,
                });
            }
        }
    }

    let best = best?;
    let col = &features[best.feature];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| col[si] <= best.threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(best.feature),
        threshold: best.threshold,
        impurity_decrease: best.decrease,
        left_indices,
        right_indices,
    })
}

/// Midpoint between two adjacent sorted values, nudged down when rounding
/// would make it equal to the upper value.
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper { lower } else { mid }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    /// Two-class Gini split over every row, one feature drawn per split.
    fn best_gini_split(
        features: &[Vec<f64>],
        labels: &[usize],
        min_samples_leaf: usize,
        seed: u64,
    ) -> Option<SplitResult> {
        let indices: Vec<usize> = (0..labels.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        find_best_split(
            features,
            labels,
            &indices,
            2,
            SplitCriterion::Gini,
            1,
            min_samples_leaf,
            &mut rng,
        )
    }

    #[test]
    fn gini_values() {
        assert!(SplitCriterion::Gini.impurity(&[10, 0], 10).is_pure());
        let balanced = SplitCriterion::Gini.impurity(&[5, 5], 10);
        assert!((balanced.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn entropy_values() {
        assert!(SplitCriterion::Entropy.impurity(&[0, 7], 7).is_pure());
        let balanced = SplitCriterion::Entropy.impurity(&[4, 4], 8);
        assert!((balanced.value() - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn empty_node_is_pure() {
        assert!(SplitCriterion::Gini.impurity(&[0, 0], 0).is_pure());
    }

    #[test]
    fn separates_load_ratio_at_the_gap() {
        // Column 0: load ratio, column 1: constant noise.
        let features = vec![
            vec![40.0, 60.0, 80.0, 110.0, 130.0, 150.0],
            vec![1.0; 6],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];

        let split = best_gini_split(&features, &labels, 1, 42).expect("split exists");

        // The constant column is skipped even though max_features = 1.
        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 95.0).abs() < 1e-12);
        assert_eq!(split.left_indices, vec![0, 1, 2]);
        assert_eq!(split.right_indices, vec![3, 4, 5]);
        assert!((split.impurity_decrease - 3.0).abs() < 1e-12);
    }

    #[test]
    fn constant_columns_give_no_split() {
        let features = vec![vec![2.5; 4]];
        let labels = vec![0, 1, 0, 1];
        assert!(best_gini_split(&features, &labels, 1, 1).is_none());
    }

    #[test]
    fn min_samples_leaf_blocks_small_children() {
        let features = vec![vec![1.0, 9.0]];
        let labels = vec![0, 1];
        assert!(best_gini_split(&features, &labels, 2, 3).is_none());
    }

    #[test]
    fn midpoint_stays_below_upper() {
        assert!((midpoint(1.0, 3.0) - 2.0).abs() < f64::EPSILON);
        let a = 1.0_f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert!(midpoint(a, b) < b);
    }
}
