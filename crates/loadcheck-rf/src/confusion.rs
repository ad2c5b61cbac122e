//! Confusion matrix and classification metrics.

use std::fmt;

use crate::error::RfError;

/// Counts of `matrix[true_class][predicted_class]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Precision, recall, F1 and support for one class.
///
/// Any ratio with a zero denominator is reported as 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub class: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples in this class.
    pub support: usize,
}

/// Headline metrics for a two-class problem, scored on the positive class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | zero labels |
    /// | [`RfError::PredictionCountMismatch`] | slices differ in length |
    /// | [`RfError::LabelOutOfRange`] | a label is `>= n_classes` |
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if true_labels.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if true_labels.len() != predicted.len() {
            return Err(RfError::PredictionCountMismatch {
                n_true: true_labels.len(),
                n_predicted: predicted.len(),
            });
        }
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in true_labels.iter().zip(predicted) {
            if let Some(label) = [t, p].into_iter().find(|&l| l >= n_classes) {
                return Err(RfError::LabelOutOfRange { label, n_classes });
            }
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Proportion of samples on the diagonal.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        ratio(correct, self.total())
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted_c: usize = self.matrix.iter().map(|row| row[c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = ratio(tp, predicted_c);
                let recall = ratio(tp, support);
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Accuracy plus precision/recall/F1 of `positive_class`.
    #[must_use]
    pub fn binary_metrics(&self, positive_class: usize) -> BinaryMetrics {
        let positive = self
            .class_metrics()
            .into_iter()
            .nth(positive_class)
            .unwrap_or(ClassMetrics {
                class: positive_class,
                precision: 0.0,
                recall: 0.0,
                f1: 0.0,
                support: 0,
            });
        BinaryMetrics {
            accuracy: self.accuracy(),
            precision: positive.precision,
            recall: positive.recall,
            f1: positive.f1,
        }
    }

    /// Per-class rows plus accuracy, macro and weighted averages, labelled
    /// with `class_names` (falling back to the class index).
    #[must_use]
    pub fn report(&self, class_names: &[&str]) -> ClassificationReport {
        let classes = self.class_metrics();
        let total = self.total();
        let n = classes.len().max(1) as f64;
        let macro_avg = AverageRow {
            precision: classes.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: classes.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: classes.iter().map(|m| m.f1).sum::<f64>() / n,
            support: total,
        };
        let weight = |f: fn(&ClassMetrics) -> f64| {
            classes.iter().map(|m| f(m) * m.support as f64).sum::<f64>() / total.max(1) as f64
        };
        let weighted_avg = AverageRow {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1: weight(|m| m.f1),
            support: total,
        };
        let names = (0..self.n_classes)
            .map(|c| {
                class_names
                    .get(c)
                    .map_or_else(|| c.to_string(), |name| (*name).to_string())
            })
            .collect();

        ClassificationReport {
            names,
            accuracy: self.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

/// Macro or support-weighted average across classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageRow {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Tabular summary of per-class metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub names: Vec<String>,
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageRow,
    pub weighted_avg: AverageRow,
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .names
            .iter()
            .map(String::len)
            .chain(["weighted avg".len()])
            .max()
            .unwrap_or(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, m) in self.names.iter().zip(&self.classes) {
            writeln!(
                f,
                "{name:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (label, row) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{label:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                row.precision, row.recall, row.f1, row.support
            )?;
        }
        Ok(())
    }
}
