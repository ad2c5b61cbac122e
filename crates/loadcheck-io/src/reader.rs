//! Reads a model configuration back from disk.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::IoError;
use crate::config::ModelConfig;

/// Reads `model_config.json` written by [`crate::ArtifactWriter`].
pub struct ConfigReader {
    path: PathBuf,
}

impl ConfigReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::ReadFile`] | file missing or unreadable |
    /// | [`IoError::ParseConfig`] | not valid configuration JSON |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<ModelConfig, IoError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| IoError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        let config: ModelConfig =
            serde_json::from_str(&text).map_err(|source| IoError::ParseConfig {
                path: self.path.clone(),
                source,
            })?;
        debug!(model_version = %config.model_version, "model configuration read");
        Ok(config)
    }
}
