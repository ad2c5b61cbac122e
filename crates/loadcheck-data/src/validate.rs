//! Dataset sanity checks run before training.

use tracing::{info, instrument};

use crate::error::DataError;
use crate::record::{ClassCounts, Dataset, FEATURE_NAMES, OverloadLabel};

/// What a passing validation saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    pub n_rows: usize,
    pub class_counts: ClassCounts,
}

/// Check every record for finite, physically plausible values and the
/// dataset for both classes.
///
/// Row checks run in record order and the first failure is returned.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`DataError::EmptyDataset`] | zero records |
/// | [`DataError::NonFiniteValue`] | a feature is NaN or infinite |
/// | [`DataError::OutOfRange`] | negative load, suspension or tire pressure out of range |
/// | [`DataError::MissingClass`] | one label never appears |
#[instrument(skip_all, fields(n_rows = dataset.len()))]
pub fn validate(dataset: &Dataset) -> Result<ValidationSummary, DataError> {
    if dataset.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    for (row_index, record) in dataset.records().iter().enumerate() {
        for (column, value) in FEATURE_NAMES.into_iter().zip(record.features()) {
            if !value.is_finite() {
                return Err(DataError::NonFiniteValue {
                    row_index,
                    column,
                    value,
                });
            }
        }

        let out_of_range =
            |column: &'static str, value: f64, expected: &'static str| DataError::OutOfRange {
                row_index,
                column,
                value,
                expected,
            };
        if !(0.0..=100.0).contains(&record.suspension) {
            return Err(out_of_range("suspension", record.suspension, "0..=100"));
        }
        if record.tire_pressure <= 0.0 || record.tire_pressure > 100.0 {
            return Err(out_of_range(
                "tire_pressure",
                record.tire_pressure,
                "> 0 and <= 100",
            ));
        }
        if record.current_load < 0.0 {
            return Err(out_of_range("current_load", record.current_load, ">= 0"));
        }
        if record.max_load < 0.0 {
            return Err(out_of_range("max_load", record.max_load, ">= 0"));
        }
    }

    let class_counts = dataset.class_counts();
    if let Some(missing) = OverloadLabel::ALL
        .into_iter()
        .find(|&label| class_counts.get(label) == 0)
    {
        return Err(DataError::MissingClass { missing });
    }

    info!(
        normal = class_counts.normal,
        overloaded = class_counts.overloaded,
        "dataset validation passed"
    );
    Ok(ValidationSummary {
        n_rows: dataset.len(),
        class_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::record;

    fn two_class() -> Vec<crate::VehicleRecord> {
        vec![
            record(50.0, OverloadLabel::Normal),
            record(130.0, OverloadLabel::Overloaded),
        ]
    }

    fn validate_with(
        edit: impl FnOnce(&mut crate::VehicleRecord),
    ) -> Result<ValidationSummary, DataError> {
        let mut records = two_class();
        edit(&mut records[1]);
        validate(&Dataset::new(records))
    }

    #[test]
    fn valid_dataset_summary() {
        let summary = validate(&Dataset::new(two_class())).unwrap();
        assert_eq!(summary.n_rows, 2);
        assert_eq!(summary.class_counts.normal, 1);
        assert_eq!(summary.class_counts.overloaded, 1);
    }

    #[test]
    fn empty_dataset() {
        assert!(matches!(
            validate(&Dataset::default()),
            Err(DataError::EmptyDataset)
        ));
    }

    #[test]
    fn nan_and_infinity_rejected() {
        let err = validate_with(|r| r.weight = f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteValue { row_index: 1, column: "weight", .. }
        ));
        let err = validate_with(|r| r.speed = f64::INFINITY).unwrap_err();
        assert!(matches!(
            err,
            DataError::NonFiniteValue { column: "speed", .. }
        ));
    }

    #[test]
    fn suspension_bounds_inclusive() {
        assert!(validate_with(|r| r.suspension = 0.0).is_ok());
        assert!(validate_with(|r| r.suspension = 100.0).is_ok());
        let err = validate_with(|r| r.suspension = 100.5).unwrap_err();
        assert!(matches!(
            err,
            DataError::OutOfRange { column: "suspension", .. }
        ));
        assert!(validate_with(|r| r.suspension = -1.0).is_err());
    }

    #[test]
    fn tire_pressure_must_be_positive() {
        let err = validate_with(|r| r.tire_pressure = 0.0).unwrap_err();
        assert!(matches!(
            err,
            DataError::OutOfRange { column: "tire_pressure", .. }
        ));
        assert!(validate_with(|r| r.tire_pressure = 101.0).is_err());
        assert!(validate_with(|r| r.tire_pressure = 100.0).is_ok());
    }

    #[test]
    fn negative_loads_rejected() {
        let err = validate_with(|r| r.current_load = -0.1).unwrap_err();
        assert!(matches!(
            err,
            DataError::OutOfRange { column: "current_load", .. }
        ));
        let err = validate_with(|r| r.max_load = -5.0).unwrap_err();
        assert!(matches!(
            err,
            DataError::OutOfRange { column: "max_load", .. }
        ));
    }

    #[test]
    fn single_class_rejected() {
        let ds = Dataset::new(vec![
            record(40.0, OverloadLabel::Normal),
            record(60.0, OverloadLabel::Normal),
        ]);
        assert!(matches!(
            validate(&ds),
            Err(DataError::MissingClass { missing: OverloadLabel::Overloaded })
        ));
    }
}
