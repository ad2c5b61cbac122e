//! Random Forest classification: train, evaluate, predict, persist.
//!
//! CART trees with Gini/entropy splits, bootstrap bagging with per-split
//! feature subsampling, parallel training via rayon, MDI feature importances,
//! confusion-matrix metrics, and bincode model files.

mod config;
mod confusion;
mod error;
mod forest;
mod importance;
mod node;
mod predict;
mod result;
mod serialize;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{
    AverageRow, BinaryMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix,
};
pub use error::RfError;
pub use forest::RandomForest;
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use result::{RandomForestResult, TrainingSummary};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig, check_dataset};
