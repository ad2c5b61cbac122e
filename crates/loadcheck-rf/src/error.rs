use std::path::PathBuf;

/// Errors from Random Forest training, prediction, evaluation and model files.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// A forest or tree hyperparameter is outside its valid range.
    #[error("{name} must be {expected}, got {value}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// `max_features` resolved to 0 or to more columns than the data has.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        max_features: usize,
        n_features: usize,
    },

    #[error("dataset has zero samples")]
    EmptyDataset,

    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch { n_samples: usize, n_labels: usize },

    /// A training row is wider or narrower than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        sample_index: usize,
    },

    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },

    #[error("non-finite value {value} at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
        value: f64,
    },

    /// A true or predicted label does not fit the confusion matrix.
    #[error("label {label} is out of range for {n_classes} classes")]
    LabelOutOfRange { label: usize, n_classes: usize },

    #[error("got {n_predicted} predictions for {n_true} true labels")]
    PredictionCountMismatch { n_true: usize, n_predicted: usize },

    #[error("failed to serialize model")]
    SerializeModel { source: Box<bincode::ErrorKind> },

    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        path: PathBuf,
        source: Box<bincode::ErrorKind>,
    },

    #[error("failed to write model to {path}")]
    WriteModel {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read model from {path}")]
    ReadModel {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The model file was written by an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        expected: u32,
        found: u32,
        path: PathBuf,
    },
}
