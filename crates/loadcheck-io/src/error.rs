//! I/O error types for loadcheck-io.

use std::path::PathBuf;

/// Errors from artifact layout and model configuration I/O.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a configuration file cannot be read.
    #[error("cannot read file {path}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the configuration cannot be encoded as JSON.
    #[error("cannot serialize model configuration")]
    SerializeConfig {
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a configuration file is not valid model configuration JSON.
    #[error("invalid model configuration in {path}")]
    ParseConfig {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}
