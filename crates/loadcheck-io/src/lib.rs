//! Artifact layout and JSON model configuration for the loadcheck pipeline.

mod config;
mod error;
mod reader;
mod writer;

pub use config::{
    EvaluationMetrics, MODEL_NAME, MODEL_TYPE, MODEL_VERSION, ModelConfig, ModelParameters,
    SCALER_TYPE,
};
pub use error::IoError;
pub use reader::ConfigReader;
pub use writer::{ArtifactWriter, CONFIG_FILE, MODEL_FILE, SCALER_FILE};
