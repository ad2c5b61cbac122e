//! Per-column standardization to zero mean and unit variance.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::DataError;

const FORMAT_VERSION: u32 = 1;

/// Learns column means and population standard deviations and maps each
/// value to `(x - mean) / scale`.
///
/// A column with zero variance gets a scale of 1, so it is centred but not
/// divided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
    n_samples_seen: usize,
}

#[derive(Serialize, Deserialize)]
struct ScalerEnvelope {
    format_version: u32,
    scaler: StandardScaler,
}

impl StandardScaler {
    /// Learn column statistics from a row-major matrix.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::EmptyDataset`] | zero rows or zero columns |
    /// | [`DataError::RaggedRow`] | rows differ in width |
    /// | [`DataError::NonFiniteInput`] | a value is NaN or infinite |
    #[instrument(skip_all, fields(n_rows = rows.len()))]
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, DataError> {
        let n_features = rows.first().map_or(0, Vec::len);
        if rows.is_empty() || n_features == 0 {
            return Err(DataError::EmptyDataset);
        }
        check_rows(rows, n_features)?;

        let n = rows.len() as f64;
        let mut mean = vec![0.0; n_features];
        for row in rows {
            for (m, v) in mean.iter_mut().zip(row) {
                *m += v;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; n_features];
        for row in rows {
            for ((acc, v), m) in var.iter_mut().zip(row).zip(&mean) {
                *acc += (v - m).powi(2);
            }
        }
        let scale = var
            .into_iter()
            .map(|ss| {
                let std = (ss / n).sqrt();
                if std == 0.0 { 1.0 } else { std }
            })
            .collect();

        debug!(n_features, "scaler fitted");
        Ok(Self {
            mean,
            scale,
            n_samples_seen: rows.len(),
        })
    }

    /// Standardize every row.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::RaggedRow`] | a row width differs from the fitted width |
    /// | [`DataError::NonFiniteInput`] | a value is NaN or infinite |
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DataError> {
        check_rows(rows, self.n_features())?;
        Ok(rows.iter().map(|row| self.scale_row(row)).collect())
    }

    /// Standardize one row.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StandardScaler::transform`], reported as row 0.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, DataError> {
        check_row(0, row, self.n_features())?;
        Ok(self.scale_row(row))
    }

    /// Fit on `rows` and return the scaler with the standardized rows.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StandardScaler::fit`].
    pub fn fit_transform(rows: &[Vec<f64>]) -> Result<(Self, Vec<Vec<f64>>), DataError> {
        let scaler = Self::fit(rows)?;
        let scaled = rows.iter().map(|row| scaler.scale_row(row)).collect();
        Ok((scaler, scaled))
    }

    fn scale_row(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }

    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    #[must_use]
    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    /// Write the scaler to `path` as a bincode envelope.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::SerializeScaler`] | bincode encoding failed |
    /// | [`DataError::WriteFile`] | file write failed |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DataError> {
        let path = path.as_ref();
        let envelope = ScalerEnvelope {
            format_version: FORMAT_VERSION,
            scaler: self.clone(),
        };
        let bytes =
            bincode::serialize(&envelope).map_err(|source| DataError::SerializeScaler { source })?;
        std::fs::write(path, &bytes).map_err(|source| DataError::WriteFile {
            path: path.to_path_buf(),
            source,
        })?;
        info!(size_bytes = bytes.len(), "scaler saved");
        Ok(())
    }

    /// Read a scaler written by [`StandardScaler::save`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::ReadFile`] | file read failed |
    /// | [`DataError::DeserializeScaler`] | bincode decoding failed |
    /// | [`DataError::IncompatibleScalerVersion`] | format version mismatch |
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DataError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let envelope: ScalerEnvelope =
            bincode::deserialize(&bytes).map_err(|source| DataError::DeserializeScaler {
                path: path.to_path_buf(),
                source,
            })?;
        if envelope.format_version != FORMAT_VERSION {
            return Err(DataError::IncompatibleScalerVersion {
                expected: FORMAT_VERSION,
                found: envelope.format_version,
                path: path.to_path_buf(),
            });
        }
        debug!(n_features = envelope.scaler.n_features(), "scaler loaded");
        Ok(envelope.scaler)
    }
}

fn check_rows(rows: &[Vec<f64>], n_features: usize) -> Result<(), DataError> {
    rows.iter()
        .enumerate()
        .try_for_each(|(row_index, row)| check_row(row_index, row, n_features))
}

fn check_row(row_index: usize, row: &[f64], n_features: usize) -> Result<(), DataError> {
    if row.len() != n_features {
        return Err(DataError::RaggedRow {
            row_index,
            expected: n_features,
            got: row.len(),
        });
    }
    if let Some(col_index) = row.iter().position(|v| !v.is_finite()) {
        return Err(DataError::NonFiniteInput {
            row_index,
            col_index,
        });
    }
    Ok(())
}
