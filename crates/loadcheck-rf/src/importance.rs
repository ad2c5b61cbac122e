//! Feature importance aggregation across trees.

use serde::{Deserialize, Serialize};

/// A feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub name: String,
    /// Share of the forest's total impurity decrease (sums to 1.0).
    pub importance: f64,
    /// 1 = most important.
    pub rank: usize,
}

/// Average per-tree MDI vectors, renormalize, and rank descending.
///
/// Ties keep column order. Returns an empty list when there are no trees
/// or no names.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    if per_tree.is_empty() || names.is_empty() {
        return Vec::new();
    }

    let mut totals = vec![0.0f64; names.len()];
    for tree in per_tree {
        for (total, value) in totals.iter_mut().zip(tree) {
            *total += value;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["current_load", "load_ratio", "speed"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn ranks_by_averaged_importance() {
        let per_tree = vec![vec![0.2, 0.8, 0.0], vec![0.0, 0.6, 0.4]];
        let ranked = aggregate_importances(&per_tree, &names());
        assert_eq!(ranked[0].name, "load_ratio");
        assert!((ranked[0].importance - 0.7).abs() < 1e-12);
        assert_eq!(ranked[1].name, "speed");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn all_zero_trees_stay_zero() {
        let ranked = aggregate_importances(&[vec![0.0; 3]], &names());
        assert!(ranked.iter().all(|f| f.importance == 0.0));
        assert_eq!(ranked[0].name, "current_load");
    }

    #[test]
    fn empty_inputs_give_empty_ranking() {
        assert!(aggregate_importances(&[], &names()).is_empty());
    }
}
