//! Vehicle load records and the in-memory dataset.

use std::fmt;

use crate::summary::{ColumnSummary, Description};

/// Number of feature columns per record.
pub const N_FEATURES: usize = 7;

/// Feature columns in the order the classifier consumes them.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "current_load",
    "max_load",
    "load_ratio",
    "suspension",
    "tire_pressure",
    "weight",
    "speed",
];

/// Name of the binary label column.
pub const LABEL_COLUMN: &str = "is_overloaded";

/// Binary overload label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverloadLabel {
    Normal,
    Overloaded,
}

impl OverloadLabel {
    /// Both labels, ordered by class index.
    pub const ALL: [OverloadLabel; 2] = [OverloadLabel::Normal, OverloadLabel::Overloaded];

    /// Class index used by the classifier (`Normal = 0`, `Overloaded = 1`).
    #[must_use]
    pub fn class_index(self) -> usize {
        match self {
            OverloadLabel::Normal => 0,
            OverloadLabel::Overloaded => 1,
        }
    }

    #[must_use]
    pub fn from_class_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name used in reports.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OverloadLabel::Normal => "Normal",
            OverloadLabel::Overloaded => "Overloaded",
        }
    }
}

impl fmt::Display for OverloadLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One labeled vehicle observation.
///
/// `load_ratio` is `current_load / max_load * 100`. For synthetic records it
/// sits at or below 95 for [`OverloadLabel::Normal`] and in `[105, 160)` for
/// [`OverloadLabel::Overloaded`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleRecord {
    pub current_load: f64,
    pub max_load: f64,
    pub load_ratio: f64,
    pub suspension: f64,
    pub tire_pressure: f64,
    pub weight: f64,
    pub speed: f64,
    pub label: OverloadLabel,
}

impl VehicleRecord {
    /// Feature values in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn features(&self) -> [f64; N_FEATURES] {
        [
            self.current_load,
            self.max_load,
            self.load_ratio,
            self.suspension,
            self.tire_pressure,
            self.weight,
            self.speed,
        ]
    }
}

/// An unlabeled reading submitted for prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleReading {
    pub current_load: f64,
    pub max_load: f64,
    pub suspension: f64,
    pub tire_pressure: f64,
    pub weight: f64,
    pub speed: f64,
}

impl VehicleReading {
    /// Current load as a percentage of the rated maximum.
    #[must_use]
    pub fn load_ratio(&self) -> f64 {
        self.current_load / self.max_load * 100.0
    }

    /// Feature values in [`FEATURE_NAMES`] order, with the derived ratio.
    #[must_use]
    pub fn features(&self) -> [f64; N_FEATURES] {
        [
            self.current_load,
            self.max_load,
            self.load_ratio(),
            self.suspension,
            self.tire_pressure,
            self.weight,
            self.speed,
        ]
    }
}

/// Per-class record counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassCounts {
    pub normal: usize,
    pub overloaded: usize,
}

impl ClassCounts {
    #[must_use]
    pub fn get(&self, label: OverloadLabel) -> usize {
        match label {
            OverloadLabel::Normal => self.normal,
            OverloadLabel::Overloaded => self.overloaded,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.normal + self.overloaded
    }
}

/// An ordered collection of labeled records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<VehicleRecord>,
}

impl Dataset {
    #[must_use]
    pub fn new(records: Vec<VehicleRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row-major feature matrix in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(|r| r.features().to_vec()).collect()
    }

    /// Class indices, one per record.
    #[must_use]
    pub fn labels(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.label.class_index()).collect()
    }

    #[must_use]
    pub fn class_counts(&self) -> ClassCounts {
        let overloaded = self
            .records
            .iter()
            .filter(|r| r.label == OverloadLabel::Overloaded)
            .count();
        ClassCounts {
            normal: self.records.len() - overloaded,
            overloaded,
        }
    }

    /// Records at `indices`, in that order.
    pub(crate) fn select(&self, indices: &[usize]) -> Dataset {
        Dataset::new(indices.iter().map(|&i| self.records[i]).collect())
    }

    /// Summary statistics for every feature column and the label column.
    #[must_use]
    pub fn describe(&self) -> Description {
        let mut columns: Vec<ColumnSummary> = FEATURE_NAMES
            .iter()
            .enumerate()
            .map(|(col, name)| {
                let values: Vec<f64> = self.records.iter().map(|r| r.features()[col]).collect();
                ColumnSummary::from_values(name, &values)
            })
            .collect();
        let labels: Vec<f64> = self
            .records
            .iter()
            .map(|r| r.label.class_index() as f64)
            .collect();
        columns.push(ColumnSummary::from_values(LABEL_COLUMN, &labels));
        Description::new(columns)
    }
}

impl FromIterator<VehicleRecord> for Dataset {
    fn from_iter<I: IntoIterator<Item = VehicleRecord>>(iter: I) -> Self {
        Dataset::new(iter.into_iter().collect())
    }
}
