//! What [`RandomForestConfig::fit`](crate::RandomForestConfig::fit) hands back.

use std::time::Duration;

use crate::forest::RandomForest;
use crate::importance::RankedFeature;
use crate::tree::DecisionTree;

/// Training-set balance and the shape of the grown ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub n_samples: usize,
    /// Training rows per class index, before bootstrapping.
    pub class_counts: Vec<usize>,
    /// Features drawn per split after resolving [`MaxFeatures`](crate::MaxFeatures).
    pub features_per_split: usize,
    pub mean_depth: f64,
    /// Deepest tree in the ensemble; never above the configured `max_depth`.
    pub max_depth_reached: usize,
    pub mean_leaves: f64,
    pub elapsed: Duration,
}

impl TrainingSummary {
    pub(crate) fn new(
        labels: &[usize],
        n_classes: usize,
        features_per_split: usize,
        trees: &[DecisionTree],
        elapsed: Duration,
    ) -> Self {
        let mut class_counts = vec![0usize; n_classes];
        for &label in labels {
            class_counts[label] += 1;
        }
        let n_trees = trees.len().max(1) as f64;
        let depths: Vec<usize> = trees.iter().map(DecisionTree::depth).collect();
        let total_leaves: usize = trees.iter().map(DecisionTree::n_leaves).sum();
        Self {
            n_samples: labels.len(),
            class_counts,
            features_per_split,
            mean_depth: depths.iter().sum::<usize>() as f64 / n_trees,
            max_depth_reached: depths.iter().copied().max().unwrap_or(0),
            mean_leaves: total_leaves as f64 / n_trees,
            elapsed,
        }
    }
}

#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    summary: TrainingSummary,
}

impl RandomForestResult {
    pub(crate) fn new(
        forest: RandomForest,
        importances: Vec<RankedFeature>,
        summary: TrainingSummary,
    ) -> Self {
        Self {
            forest,
            importances,
            summary,
        }
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Feature importances, most important first.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    #[must_use]
    pub fn summary(&self) -> &TrainingSummary {
        &self.summary
    }
}
