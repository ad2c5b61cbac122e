//! Error types for loadcheck-data.

use std::path::PathBuf;

use crate::record::OverloadLabel;

/// Errors from dataset generation, validation, splitting, scaling and CSV I/O.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when fewer than two samples are requested.
    #[error("n_samples must be at least 2, got {n_samples}")]
    InvalidSampleCount {
        /// The rejected sample count.
        n_samples: usize,
    },

    /// Returned when a uniform range is empty, inverted, or non-finite.
    #[error("invalid range for {field}: [{low}, {high})")]
    InvalidRange {
        /// Profile field the range belongs to.
        field: &'static str,
        /// Lower bound (inclusive).
        low: f64,
        /// Upper bound (exclusive).
        high: f64,
    },

    /// Returned when the normal ratio cap and overloaded ratio range overlap
    /// the 100% boundary that defines the label.
    #[error("ratio bounds straddle 100%: normal cap {normal_cap}, overloaded low {overloaded_low}")]
    RatioBoundsOverlap {
        /// Upper clip for normal records.
        normal_cap: f64,
        /// Lower bound of the overloaded ratio range.
        overloaded_low: f64,
    },

    /// Returned when a dataset has no rows.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Returned when a feature value is NaN or infinite.
    #[error("non-finite value in row {row_index}, column {column}: {value}")]
    NonFiniteValue {
        /// Zero-based row index.
        row_index: usize,
        /// Column name.
        column: &'static str,
        /// The offending value.
        value: f64,
    },

    /// Returned when a value falls outside its physical range.
    #[error("{column} out of range in row {row_index}: {value} (expected {expected})")]
    OutOfRange {
        /// Zero-based row index.
        row_index: usize,
        /// Column name.
        column: &'static str,
        /// The offending value.
        value: f64,
        /// Human-readable allowed range.
        expected: &'static str,
    },

    /// Returned when one of the two labels never appears.
    #[error("dataset must contain both classes, no {missing} records found")]
    MissingClass {
        /// The absent label.
        missing: OverloadLabel,
    },

    /// Returned when the test fraction is not strictly between 0 and 1.
    #[error("test fraction must be in (0, 1), got {fraction}")]
    InvalidTestFraction {
        /// The rejected fraction.
        fraction: f64,
    },

    /// Returned when a class has too few records to appear on both sides of a split.
    #[error("class {label} has {count} records, need at least 2 to stratify")]
    ClassTooSmall {
        /// The undersized class.
        label: OverloadLabel,
        /// Number of records of that class.
        count: usize,
    },

    /// Returned when the train or test side would hold fewer records than classes.
    #[error("split sizes train={n_train}, test={n_test} must each be at least {n_classes}")]
    SplitTooSmall {
        /// Records assigned to training.
        n_train: usize,
        /// Records assigned to testing.
        n_test: usize,
        /// Number of classes.
        n_classes: usize,
    },

    /// Returned when the scaler sees rows of differing widths.
    #[error("row {row_index} has {got} columns, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row_index: usize,
        /// Expected width.
        expected: usize,
        /// Actual width.
        got: usize,
    },

    /// Returned when the scaler sees NaN or infinite input.
    #[error("non-finite scaler input at row {row_index}, column {col_index}")]
    NonFiniteInput {
        /// Zero-based row index.
        row_index: usize,
        /// Zero-based column index.
        col_index: usize,
    },

    /// Returned when bincode encoding of the scaler fails.
    #[error("failed to serialize scaler")]
    SerializeScaler {
        /// Underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when a scaler file cannot be decoded.
    #[error("failed to deserialize scaler from {path}")]
    DeserializeScaler {
        /// Path to the scaler file.
        path: PathBuf,
        /// Underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when a scaler file was written by an incompatible version.
    #[error("incompatible scaler format in {path}: expected version {expected}, found {found}")]
    IncompatibleScalerVersion {
        /// Version this build reads.
        expected: u32,
        /// Version stored in the file.
        found: u32,
        /// Path to the scaler file.
        path: PathBuf,
    },

    /// Returned when a file cannot be read.
    #[error("cannot read {path}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a file cannot be written.
    #[error("cannot write {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser or writer fails on a record.
    #[error("CSV error in {path} at byte offset {offset}")]
    Csv {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV header lacks a required column.
    #[error("missing required column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// The absent column.
        column: &'static str,
    },

    /// Returned when a CSV cell is empty.
    #[error("null value in {path}: row {row_index}, column {column}")]
    NullValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column name.
        column: &'static str,
    },

    /// Returned when a CSV cell is not a number.
    #[error("invalid number in {path}: row {row_index}, column {column}, raw value \"{raw}\"")]
    InvalidNumber {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column name.
        column: &'static str,
        /// The raw cell text.
        raw: String,
    },

    /// Returned when the label cell is neither 0 nor 1.
    #[error("invalid label in {path}: row {row_index}, raw value \"{raw}\" (expected 0 or 1)")]
    InvalidLabel {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// The raw cell text.
        raw: String,
    },
}
