//! Vehicle load records: synthetic generation, validation, stratified
//! splitting, standardization, and CSV I/O.

mod error;
mod reader;
mod record;
mod scaler;
mod split;
mod summary;
mod synthetic;
mod validate;
mod writer;

pub use error::DataError;
pub use reader::DatasetReader;
pub use record::{
    ClassCounts, Dataset, FEATURE_NAMES, LABEL_COLUMN, N_FEATURES, OverloadLabel, VehicleReading,
    VehicleRecord,
};
pub use scaler::StandardScaler;
pub use split::{StratifiedSplit, TrainTestSplit};
pub use summary::{ColumnSummary, Description};
pub use synthetic::{NormalProfile, OverloadedProfile, SyntheticConfig, UniformRange};
pub use validate::{ValidationSummary, validate};
pub use writer::DatasetWriter;
