//! CSV dataset writer.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::DataError;
use crate::record::{Dataset, FEATURE_NAMES, LABEL_COLUMN};

/// Writes a dataset in the layout [`crate::DatasetReader`] reads.
///
/// Floats use the shortest representation that parses back to the same
/// value, so a written dataset reads back unchanged.
pub struct DatasetWriter {
    path: PathBuf,
}

impl DatasetWriter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::WriteFile`] | file cannot be created or flushed |
    /// | [`DataError::Csv`] | a record cannot be written |
    #[instrument(skip_all, fields(path = %self.path.display(), n_rows = dataset.len()))]
    pub fn write(&self, dataset: &Dataset) -> Result<(), DataError> {
        let file = std::fs::File::create(&self.path).map_err(|source| DataError::WriteFile {
            path: self.path.clone(),
            source,
        })?;
        let mut wtr = csv::Writer::from_writer(file);

        let header = FEATURE_NAMES.iter().copied().chain([LABEL_COLUMN]);
        wtr.write_record(header).map_err(|e| self.csv_error(e))?;
        for record in dataset.records() {
            let row = record
                .features()
                .into_iter()
                .map(|v| v.to_string())
                .chain([record.label.class_index().to_string()]);
            wtr.write_record(row).map_err(|e| self.csv_error(e))?;
        }
        wtr.flush().map_err(|source| DataError::WriteFile {
            path: self.path.clone(),
            source,
        })?;

        info!("dataset written");
        Ok(())
    }

    fn csv_error(&self, source: csv::Error) -> DataError {
        DataError::Csv {
            path: self.path.clone(),
            offset: source.position().map_or(0, |p| p.byte()),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::reader::DatasetReader;
    use crate::record::OverloadLabel;
    use crate::record::tests::record;

    #[test]
    fn written_file_reads_back_identically() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vehicles.csv");
        let ds = Dataset::new(vec![
            record(1.0 / 3.0 * 100.0, OverloadLabel::Normal),
            record(123.456_789, OverloadLabel::Overloaded),
        ]);

        DatasetWriter::new(&path).write(&ds).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "current_load,max_load,load_ratio,suspension,tire_pressure,weight,speed,is_overloaded\n"
        ));
        assert_eq!(DatasetReader::new(&path).read().unwrap(), ds);
    }

    #[test]
    fn unwritable_path() {
        let err = DatasetWriter::new(Path::new("/nonexistent/dir/out.csv"))
            .write(&Dataset::default())
            .unwrap_err();
        assert!(matches!(err, DataError::WriteFile { .. }));
    }
}
