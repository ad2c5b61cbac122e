//! Artifact directory layout and configuration writer.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, info, instrument};

use crate::IoError;
use crate::config::ModelConfig;

pub const MODEL_FILE: &str = "vehicle_overload_model.bin";
pub const SCALER_FILE: &str = "scaler.bin";
pub const CONFIG_FILE: &str = "model_config.json";

/// Owns the output directory and the names of the three artifacts.
///
/// Creates the output directory on construction if it does not exist. The
/// model and scaler are written by their own crates through
/// [`ArtifactWriter::model_path`] and [`ArtifactWriter::scaler_path`]; the
/// configuration is written here.
pub struct ArtifactWriter {
    output_dir: PathBuf,
}

impl ArtifactWriter {
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join(MODEL_FILE)
    }

    #[must_use]
    pub fn scaler_path(&self) -> PathBuf {
        self.output_dir.join(SCALER_FILE)
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.output_dir.join(CONFIG_FILE)
    }

    /// Write `config` to `model_config.json` with 4-space indentation.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeConfig`] | JSON encoding failed |
    /// | [`IoError::WriteFile`] | file write failed |
    #[instrument(skip_all)]
    pub fn write_config(&self, config: &ModelConfig) -> Result<PathBuf, IoError> {
        let path = self.config_path();

        let mut json = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut json, formatter);
        config
            .serialize(&mut ser)
            .map_err(|source| IoError::SerializeConfig { source })?;

        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        info!(path = %path.display(), "model configuration written");
        Ok(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Local, NaiveDate};
    use tempfile::TempDir;

    use super::*;
    use crate::config::{EvaluationMetrics, ModelParameters};

    pub(crate) fn sample_config() -> ModelConfig {
        let training_date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_micro_opt(9, 30, 15, 250_000))
            .unwrap();
        ModelConfig::new(
            ModelParameters {
                n_estimators: 100,
                max_depth: Some(10),
                random_state: 42,
            },
            vec!["current_load".into(), "load_ratio".into()],
            training_date,
            EvaluationMetrics {
                accuracy: 0.995,
                precision: 1.0,
                recall: 0.99,
                f1_score: 0.994_974_874_371_859_3,
                confusion_matrix: vec![vec![100, 0], vec![1, 99]],
            },
        )
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("models");
        let writer = ArtifactWriter::new(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(writer.model_path(), nested.join("vehicle_overload_model.bin"));
        assert_eq!(writer.scaler_path(), nested.join("scaler.bin"));
    }

    #[test]
    fn config_json_layout() {
        let dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(dir.path()).unwrap();
        let path = writer.write_config(&sample_config()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"model_name\": \"Vehicle Overload Detection\""));
        assert!(text.contains("\"training_date\": \"2024-03-01T09:30:15.250000\""));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["model_type"], "RandomForestClassifier");
        assert_eq!(value["scaler_type"], "StandardScaler");
        assert_eq!(value["model_version"], "1.0.0");
        assert_eq!(value["model_parameters"]["max_depth"], 10);
        assert_eq!(value["evaluation_metrics"]["confusion_matrix"][1][0], 1);
    }

    fn written_training_date(config: &ModelConfig) -> String {
        let dir = TempDir::new().unwrap();
        let path = ArtifactWriter::new(dir.path())
            .unwrap()
            .write_config(config)
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        value["training_date"].as_str().unwrap().to_string()
    }

    #[test]
    fn training_date_keeps_at_most_microseconds() {
        let base = sample_config();
        let nanos = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_nano_opt(9, 30, 15, 123_456_789))
            .unwrap();
        let config = ModelConfig::new(
            base.model_parameters.clone(),
            base.feature_names.clone(),
            nanos,
            base.evaluation_metrics.clone(),
        );
        assert_eq!(written_training_date(&config), "2024-03-01T09:30:15.123456");

        let now = ModelConfig::new(
            base.model_parameters,
            base.feature_names,
            Local::now().naive_local(),
            base.evaluation_metrics,
        );
        let text = written_training_date(&now);
        let fraction = text.split_once('.').map_or("", |(_, f)| f);
        assert!(fraction.len() <= 6, "{text}");
    }

    #[test]
    fn whole_seconds_have_no_fraction() {
        let mut config = sample_config();
        config.training_date = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 30, 15))
            .unwrap();
        assert_eq!(written_training_date(&config), "2024-03-01T09:30:15");
    }

    #[test]
    fn unlimited_depth_is_null() {
        let dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(dir.path()).unwrap();
        let mut config = sample_config();
        config.model_parameters.max_depth = None;
        let path = writer.write_config(&config).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(value["model_parameters"]["max_depth"].is_null());
    }

    #[test]
    fn output_dir_blocked_by_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("models");
        fs::write(&blocker, b"not a directory").unwrap();
        assert!(matches!(
            ArtifactWriter::new(&blocker),
            Err(IoError::OutputDirCreate { .. })
        ));
    }
}
