use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    RfError,
    node::{Impurity, Node, NodeIndex},
    split::{SplitCriterion, find_best_split},
};

/// Configuration for a single CART decision tree.
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Limit depth to `d` levels below the root (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Number of features drawn per split; `None` considers all of them.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the tree limits against a dataset with `n_features` columns and
    /// return the resolved per-split feature count.
    pub(crate) fn validate(&self, n_features: usize) -> Result<usize, RfError> {
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidParameter {
                name: "max_depth",
                value: 0.0,
                expected: "at least 1",
            });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidParameter {
                name: "min_samples_split",
                value: self.min_samples_split as f64,
                expected: "at least 2",
            });
        }
        if self.min_samples_leaf < 1 {
            return Err(RfError::InvalidParameter {
                name: "min_samples_leaf",
                value: 0.0,
                expected: "at least 1",
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }
        Ok(max_features)
    }

    /// Train a decision tree on a row-major dataset.
    ///
    /// `n_classes` may exceed the largest label (a bootstrap sample can miss a
    /// class); leaf distributions always have `n_classes` entries.
    ///
    /// # Errors
    ///
    /// Input shape errors from [`check_dataset`] and limit errors from the
    /// configuration.
    #[instrument(level = "debug", skip_all, fields(n_samples = features.len()))]
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<DecisionTree, RfError> {
        let n_features = check_dataset(features, labels)?;
        let max_features = self.validate(n_features)?;
        let n_classes = n_classes.max(labels.iter().max().map_or(1, |&m| m + 1));

        let columns: Vec<Vec<f64>> = (0..n_features)
            .map(|feat_idx| features.iter().map(|row| row[feat_idx]).collect())
            .collect();

        let mut builder = TreeBuilder {
            columns: &columns,
            labels,
            n_classes,
            max_features,
            config: self,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            arena: Vec::new(),
        };
        let all: Vec<usize> = (0..features.len()).collect();
        builder.grow(&all, 0);

        debug!(n_nodes = builder.arena.len(), "decision tree built");

        Ok(DecisionTree {
            nodes: builder.arena,
            n_features,
            n_classes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a row-major training set and return its feature count.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::EmptyDataset`] | no rows |
/// | [`RfError::ZeroFeatures`] | rows have no columns |
/// | [`RfError::LabelCountMismatch`] | label count differs from row count |
/// | [`RfError::FeatureCountMismatch`] | ragged rows |
/// | [`RfError::NonFiniteValue`] | NaN or infinite cell |
pub fn check_dataset(features: &[Vec<f64>], labels: &[usize]) -> Result<usize, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some((feature_index, &value)) =
            row.iter().enumerate().find(|(_, v)| !v.is_finite())
        {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
                value,
            });
        }
    }
    Ok(n_features)
}

/// Index of the largest count, preferring the lowest class on ties.
pub(crate) fn argmax<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Recursive depth-first tree growth into a node arena.
struct TreeBuilder<'a> {
    columns: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    max_features: usize,
    config: &'a DecisionTreeConfig,
    rng: ChaCha8Rng,
    arena: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, sample_indices: &[usize], depth: usize) -> NodeIndex {
        let n_samples = sample_indices.len();
        let mut counts = vec![0usize; self.n_classes];
        for &si in sample_indices {
            counts[self.labels[si]] += 1;
        }
        let impurity = self.config.criterion.impurity(&counts, n_samples);

        let at_depth_limit = self.config.max_depth.is_some_and(|max| depth >= max);
        if at_depth_limit || n_samples < self.config.min_samples_split || impurity.is_pure() {
            return self.push_leaf(&counts, impurity, n_samples);
        }

        let Some(split) = find_best_split(
            self.columns,
            self.labels,
            sample_indices,
            self.n_classes,
            self.config.criterion,
            self.max_features,
            self.config.min_samples_leaf,
            &mut self.rng,
        ) else {
            return self.push_leaf(&counts, impurity, n_samples);
        };

        // Reserve the slot so the root stays at index 0, then patch it once
        // both children exist.
        let node_idx = self.push_leaf(&counts, impurity, n_samples);
        let left = self.grow(&split.left_indices, depth + 1);
        let right = self.grow(&split.right_indices, depth + 1);
        self.arena[node_idx.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            impurity_decrease: split.impurity_decrease,
        };
        node_idx
    }

    fn push_leaf(&mut self, counts: &[usize], impurity: Impurity, n_samples: usize) -> NodeIndex {
        let total = n_samples.max(1) as f64;
        self.arena.push(Node::Leaf {
            prediction: argmax(counts),
            distribution: counts.iter().map(|&c| c as f64 / total).collect(),
            impurity,
            n_samples,
        });
        NodeIndex::new(self.arena.len() - 1)
    }
}

/// A fitted CART decision tree stored as a flat node arena (root at 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Predict the class label for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        match self.leaf_for(sample)? {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("leaf_for always ends at a leaf"),
        }
    }

    /// Return the leaf class distribution (length `n_classes`, sums to 1).
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], RfError> {
        match self.leaf_for(sample)? {
            Node::Leaf { distribution, .. } => Ok(distribution),
            Node::Split { .. } => unreachable!("leaf_for always ends at a leaf"),
        }
    }

    /// Mean Decrease in Impurity per feature, normalized to sum to 1.
    ///
    /// All zeros for a single-leaf tree.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                totals[feature.index()] += impurity_decrease;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Longest root-to-leaf path; a single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }

    fn leaf_for(&self, sample: &[f64]) -> Result<&Node, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut node = &self.nodes[0];
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } = node
        {
            let next = if sample[feature.index()] <= *threshold {
                left
            } else {
                right
            };
            node = &self.nodes[next.index()];
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Load ratio in column 0 decides the label; column 1 is noise.
    fn ratio_rows() -> (Vec<Vec<f64>>, Vec<usize>) {
        let features = vec![
            vec![45.0, 3.0],
            vec![62.0, 1.0],
            vec![90.0, 2.0],
            vec![108.0, 2.0],
            vec![131.0, 3.0],
            vec![155.0, 1.0],
        ];
        (features, vec![0, 0, 0, 1, 1, 1])
    }

    #[test]
    fn empty_dataset_error() {
        let err = DecisionTreeConfig::new().fit(&[], &[], 2).unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn label_count_mismatch_error() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0], vec![2.0]], &[0], 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelCountMismatch { n_samples: 2, n_labels: 1 }
        ));
    }

    #[test]
    fn ragged_rows_error() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, 2.0], vec![3.0]], &[0, 1], 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::FeatureCountMismatch { sample_index: 1, .. }
        ));
    }

    #[test]
    fn infinite_value_error() {
        let err = DecisionTreeConfig::new()
            .fit(&[vec![1.0, f64::INFINITY], vec![3.0, 4.0]], &[0, 1], 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue { sample_index: 0, feature_index: 1, .. }
        ));
        assert!(err.to_string().contains("inf"));
    }

    #[test]
    fn zero_depth_rejected() {
        let (features, labels) = ratio_rows();
        let err = DecisionTreeConfig::new()
            .with_max_depth(Some(0))
            .fit(&features, &labels, 2)
            .unwrap_err();
        assert!(matches!(
            err,
            RfError::InvalidParameter { name: "max_depth", .. }
        ));
        assert_eq!(err.to_string(), "max_depth must be at least 1, got 0");
    }

    #[test]
    fn single_class_is_one_leaf_with_padded_distribution() {
        let tree = DecisionTreeConfig::new()
            .fit(&[vec![1.0], vec![2.0], vec![3.0]], &[0, 0, 0], 2)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba(&[9.0]).unwrap(), &[1.0, 0.0]);
        assert_eq!(tree.feature_importances(), vec![0.0]);
    }

    #[test]
    fn splits_on_load_ratio() {
        let (features, labels) = ratio_rows();
        let tree = DecisionTreeConfig::new()
            .fit(&features, &labels, 2)
            .unwrap();
        assert_eq!(tree.predict(&[70.0, 3.0]).unwrap(), 0);
        assert_eq!(tree.predict(&[120.0, 1.0]).unwrap(), 1);
        assert_eq!(tree.depth(), 1);
        let importances = tree.feature_importances();
        assert!((importances[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn xor_needs_two_levels_and_depth_limit_holds() {
        let features = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ];
        let labels = vec![0, 1, 1, 0];
        let full = DecisionTreeConfig::new()
            .fit(&features, &labels, 2)
            .unwrap();
        assert!(full.depth() >= 2);
        let stump = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &labels, 2)
            .unwrap();
        assert!(stump.depth() <= 1);
    }

    #[test]
    fn prediction_width_mismatch() {
        let (features, labels) = ratio_rows();
        let tree = DecisionTreeConfig::new()
            .fit(&features, &labels, 2)
            .unwrap();
        assert!(matches!(
            tree.predict(&[1.0]).unwrap_err(),
            RfError::PredictionFeatureMismatch { expected: 2, got: 1 }
        ));
    }

    #[test]
    fn argmax_prefers_lowest_index_on_tie() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[1, 3, 3]), 1);
        assert_eq!(argmax(&[0.2, 0.8]), 1);
    }
}
