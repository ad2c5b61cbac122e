//! Random Forest training with parallel tree construction.

use std::time::Instant;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::importance::aggregate_importances;
use crate::result::{RandomForestResult, TrainingSummary};
use crate::tree::{DecisionTree, DecisionTreeConfig, check_dataset};

/// A fitted Random Forest ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Draw `draw_count` indices with replacement from `0..n_samples`.
fn bootstrap_sample(n_samples: usize, draw_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..draw_count)
        .map(|_| rng.gen_range(0..n_samples))
        .collect()
}

/// Train the Random Forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    let n_features = check_dataset(features, labels)?;
    let n_samples = features.len();
    let max_features = config.max_features.resolve(n_features)?;

    if config.bootstrap_fraction <= 0.0 || config.bootstrap_fraction > 1.0 {
        return Err(RfError::InvalidParameter {
            name: "bootstrap_fraction",
            value: config.bootstrap_fraction,
            expected: "in (0.0, 1.0]",
        });
    }

    let tree_config = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_config.validate(n_features)?;

    let n_classes = labels.iter().max().map_or(1, |&m| m + 1);
    let draw_count = ((n_samples as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        max_depth = ?config.max_depth,
        "training random forest"
    );

    // Per-tree seeds come from one master stream, so the ensemble does not
    // depend on how rayon schedules the trees.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<(u64, u64)> = (0..config.n_trees)
        .map(|_| (master_rng.r#gen(), master_rng.r#gen()))
        .collect();

    let started = Instant::now();
    let trees = tree_seeds
        .into_par_iter()
        .map(|(bootstrap_seed, split_seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(bootstrap_seed);
            let bag = bootstrap_sample(n_samples, draw_count, &mut rng);
            let bag_features: Vec<Vec<f64>> = bag.iter().map(|&i| features[i].clone()).collect();
            let bag_labels: Vec<usize> = bag.iter().map(|&i| labels[i]).collect();
            tree_config
                .clone()
                .with_seed(split_seed)
                .fit(&bag_features, &bag_labels, n_classes)
        })
        .collect::<Result<Vec<DecisionTree>, RfError>>()?;

    let summary = TrainingSummary::new(labels, n_classes, max_features, &trees, started.elapsed());
    debug!(
        n_trees_trained = trees.len(),
        mean_depth = summary.mean_depth,
        max_depth_reached = summary.max_depth_reached,
        mean_leaves = summary.mean_leaves,
        "tree training complete"
    );

    let per_tree: Vec<Vec<f64>> = trees
        .iter()
        .map(DecisionTree::feature_importances)
        .collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    info!(
        elapsed_ms = summary.elapsed.as_millis() as u64,
        threads = rayon::current_num_threads(),
        "random forest training complete"
    );

    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };

    Ok(RandomForestResult::new(forest, importances, summary))
}

#[cfg(test)]
mod tests {
    use crate::config::{MaxFeatures, RandomForestConfig};

    /// Two classes split on column 0 with a second, weaker column.
    fn make_binary_data() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            features.push(vec![40.0 + i as f64 * 1.5, 90.0 - (i % 7) as f64]);
            labels.push(0);
        }
        for i in 0..30 {
            features.push(vec![105.0 + i as f64 * 1.8, 50.0 + (i % 9) as f64]);
            labels.push(1);
        }
        let names = vec!["load_ratio".to_string(), "suspension".to_string()];
        (features, labels, names)
    }

    #[test]
    fn separable_training_accuracy() {
        let (features, labels, names) = make_binary_data();
        let result = RandomForestConfig::new(25)
            .unwrap()
            .with_max_depth(Some(10))
            .fit(&features, &labels, &names)
            .unwrap();

        let predictions = result.forest().predict_batch(&features).unwrap();
        let correct = predictions
            .iter()
            .zip(&labels)
            .filter(|(p, l)| p == l)
            .count();
        assert_eq!(correct, labels.len());
        let summary = result.summary();
        assert_eq!(summary.class_counts, vec![30, 30]);
        assert_eq!(summary.n_samples, 60);
        assert_eq!(summary.features_per_split, 1);
        assert!(summary.max_depth_reached <= 10);
        assert!(summary.mean_leaves >= 2.0);
    }

    #[test]
    fn importances_sum_to_one_and_are_ranked() {
        let (features, labels, names) = make_binary_data();
        let result = RandomForestConfig::new(20)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&features, &labels, &names)
            .unwrap();

        let total: f64 = result.importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        assert_eq!(result.importances()[0].rank, 1);
    }

    #[test]
    fn deterministic_with_same_seed() {
        let (features, labels, names) = make_binary_data();
        let fit = || {
            RandomForestConfig::new(10)
                .unwrap()
                .with_seed(99)
                .fit(&features, &labels, &names)
                .unwrap()
        };
        let queries: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![80.0 + i as f64 * 2.5, 70.0])
            .collect();
        let a = fit().forest().predict_proba_batch(&queries).unwrap();
        let b = fit().forest().predict_proba_batch(&queries).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.as_slice(), y.as_slice());
        }
    }

    #[test]
    fn invalid_bootstrap_fraction() {
        let (features, labels, names) = make_binary_data();
        let err = RandomForestConfig::new(3)
            .unwrap()
            .with_bootstrap_fraction(0.0)
            .fit(&features, &labels, &names)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::RfError::InvalidParameter { name: "bootstrap_fraction", .. }
        ));
    }

    #[test]
    fn invalid_tree_limits_surface_before_training() {
        let (features, labels, names) = make_binary_data();
        let err = RandomForestConfig::new(3)
            .unwrap()
            .with_min_samples_split(1)
            .fit(&features, &labels, &names)
            .unwrap_err();
        let crate::RfError::InvalidParameter { name, value, .. } = err else {
            panic!("expected InvalidParameter, got {err:?}");
        };
        assert_eq!(name, "min_samples_split");
        assert_eq!(value, 1.0);
    }

    #[test]
    fn empty_dataset_error() {
        let err = RandomForestConfig::new(10)
            .unwrap()
            .fit(&[], &[], &[])
            .unwrap_err();
        assert!(matches!(err, crate::RfError::EmptyDataset));
    }
}
