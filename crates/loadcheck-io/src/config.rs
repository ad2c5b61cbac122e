//! JSON model configuration written next to the trained artifacts.
//!
//! These are plain serde structs so this crate does not depend on
//! `loadcheck-rf`; the binary copies values in.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

pub const MODEL_NAME: &str = "Vehicle Overload Detection";
pub const MODEL_VERSION: &str = "1.0.0";
pub const MODEL_TYPE: &str = "RandomForestClassifier";
pub const SCALER_TYPE: &str = "StandardScaler";

/// Hyperparameters recorded for reproducibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub n_estimators: usize,
    /// `null` when trees grow without a depth limit.
    pub max_depth: Option<usize>,
    pub random_state: u64,
}

/// Held-out evaluation scores, with overload as the positive class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// `confusion_matrix[true][predicted]`.
    pub confusion_matrix: Vec<Vec<usize>>,
}

/// Everything a consumer needs to interpret the saved model and scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_name: String,
    pub model_version: String,
    pub model_type: String,
    pub model_parameters: ModelParameters,
    pub feature_names: Vec<String>,
    /// Local time, microsecond precision.
    #[serde(with = "iso_datetime")]
    pub training_date: NaiveDateTime,
    pub evaluation_metrics: EvaluationMetrics,
    pub scaler_type: String,
}

impl ModelConfig {
    /// Build a configuration with the fixed model identity fields filled in.
    ///
    /// `training_date` is truncated to whole microseconds.
    #[must_use]
    pub fn new(
        model_parameters: ModelParameters,
        feature_names: Vec<String>,
        training_date: NaiveDateTime,
        evaluation_metrics: EvaluationMetrics,
    ) -> Self {
        Self {
            model_name: MODEL_NAME.to_string(),
            model_version: MODEL_VERSION.to_string(),
            model_type: MODEL_TYPE.to_string(),
            model_parameters,
            feature_names,
            training_date: training_date
                .with_nanosecond(training_date.nanosecond() / 1_000 * 1_000)
                .unwrap_or(training_date),
            evaluation_metrics,
            scaler_type: SCALER_TYPE.to_string(),
        }
    }
}

/// ISO-8601 without offset, e.g. `2024-03-01T09:30:15.250000`. The fraction
/// has six digits and is omitted when it is zero.
mod iso_datetime {
    use chrono::{NaiveDateTime, Timelike};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub(super) fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let whole = value.format(SECONDS_FORMAT);
        let micros = value.nanosecond() % 1_000_000_000 / 1_000;
        if micros == 0 {
            serializer.collect_str(&whole)
        } else {
            serializer.collect_str(&format_args!("{whole}.{micros:06}"))
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
