//! CSV dataset reader.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::DataError;
use crate::record::{
    Dataset, FEATURE_NAMES, LABEL_COLUMN, N_FEATURES, OverloadLabel, VehicleRecord,
};

/// Reads vehicle records from a CSV file.
///
/// Expected CSV format:
/// - Header row naming at least
///   `current_load,max_load,load_ratio,suspension,tire_pressure,weight,speed,is_overloaded`
/// - Columns may appear in any order; extra columns are ignored
/// - `is_overloaded` holds `0` or `1`
///
/// Range and class checks are left to [`crate::validate()`].
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::ReadFile`] | File doesn't exist or is unreadable |
/// | [`DataError::Csv`] | Malformed CSV record |
/// | [`DataError::MissingColumn`] | Header lacks a required column |
/// | [`DataError::NullValue`] | Required cell is empty or absent |
/// | [`DataError::InvalidNumber`] | Feature cell is not a number |
/// | [`DataError::InvalidLabel`] | Label cell is not `0` or `1` |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Dataset, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|source| DataError::ReadFile {
            path: self.path.clone(),
            source,
        })?;

        // flexible(true) lets short rows through so they surface as NullValue
        // rather than a low-level length error.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let feature_cols = FEATURE_NAMES
            .iter()
            .map(|&name| self.column_index(header, name))
            .collect::<Result<Vec<usize>, DataError>>()?;
        let label_col = self.column_index(header, LABEL_COLUMN)?;
        debug!(n_columns = header.len(), "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| self.csv_error(e))?;

            let mut values = [0.0; N_FEATURES];
            let cells = values.iter_mut().zip(&feature_cols).zip(FEATURE_NAMES);
            for ((value, &col), column) in cells {
                let raw = self.cell(&row, row_index, col, column)?;
                *value = raw.parse().map_err(|_| DataError::InvalidNumber {
                    path: self.path.clone(),
                    row_index,
                    column,
                    raw: raw.to_string(),
                })?;
            }

            let raw_label = self.cell(&row, row_index, label_col, LABEL_COLUMN)?;
            let label = parse_label(raw_label).ok_or_else(|| DataError::InvalidLabel {
                path: self.path.clone(),
                row_index,
                raw: raw_label.to_string(),
            })?;

            let [current_load, max_load, load_ratio, suspension, tire_pressure, weight, speed] =
                values;
            records.push(VehicleRecord {
                current_load,
                max_load,
                load_ratio,
                suspension,
                tire_pressure,
                weight,
                speed,
                label,
            });
        }

        info!(n_rows = records.len(), "dataset loaded");
        Ok(Dataset::new(records))
    }

    fn column_index(
        &self,
        header: &csv::StringRecord,
        column: &'static str,
    ) -> Result<usize, DataError> {
        header
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataError::MissingColumn {
                path: self.path.clone(),
                column,
            })
    }

    fn cell<'r>(
        &self,
        row: &'r csv::StringRecord,
        row_index: usize,
        col: usize,
        column: &'static str,
    ) -> Result<&'r str, DataError> {
        match row.get(col) {
            Some(raw) if !raw.is_empty() => Ok(raw),
            _ => Err(DataError::NullValue {
                path: self.path.clone(),
                row_index,
                column,
            }),
        }
    }

    fn csv_error(&self, source: csv::Error) -> DataError {
        DataError::Csv {
            path: self.path.clone(),
            offset: source.position().map_or(0, |p| p.byte()),
            source,
        }
    }
}

/// Accepts `0`/`1` and their float spellings.
fn parse_label(raw: &str) -> Option<OverloadLabel> {
    match raw.parse::<f64>() {
        Ok(v) if v == 0.0 => Some(OverloadLabel::Normal),
        Ok(v) if v == 1.0 => Some(OverloadLabel::Overloaded),
        _ => None,
    }
}
