//! Stratified train/test splitting.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::error::DataError;
use crate::record::{Dataset, OverloadLabel};

/// Train and test partitions of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train: Dataset,
    pub test: Dataset,
}

/// Holds out a fixed fraction of records while keeping class proportions.
///
/// # Example
///
/// ```
/// use loadcheck_data::{StratifiedSplit, SyntheticConfig};
///
/// let dataset = SyntheticConfig::new(100)?.generate()?;
/// let split = StratifiedSplit::new(0.2)?.with_seed(42).split(&dataset)?;
/// assert_eq!(split.test.len(), 20);
/// assert_eq!(split.train.len(), 80);
/// # Ok::<(), loadcheck_data::DataError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StratifiedSplit {
    test_fraction: f64,
    seed: u64,
}

impl StratifiedSplit {
    /// # Errors
    ///
    /// Returns [`DataError::InvalidTestFraction`] unless `0 < test_fraction < 1`.
    pub fn new(test_fraction: f64) -> Result<Self, DataError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DataError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: 42,
        })
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Partition `dataset` into train and test sets.
    ///
    /// The test set holds `ceil(test_fraction * n)` records. Each class gets
    /// its proportional share, rounded down, and leftover slots go to the
    /// classes with the largest fractional remainder (lowest class index on
    /// ties). Both sides are shuffled.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::EmptyDataset`] | zero records |
    /// | [`DataError::ClassTooSmall`] | a present class has fewer than 2 records |
    /// | [`DataError::SplitTooSmall`] | either side would hold fewer records than classes |
    #[instrument(skip_all, fields(n_rows = dataset.len(), test_fraction = self.test_fraction))]
    pub fn split(&self, dataset: &Dataset) -> Result<TrainTestSplit, DataError> {
        let n = dataset.len();
        if n == 0 {
            return Err(DataError::EmptyDataset);
        }

        let mut class_indices: Vec<Vec<usize>> = vec![Vec::new(); OverloadLabel::ALL.len()];
        for (i, record) in dataset.records().iter().enumerate() {
            class_indices[record.label.class_index()].push(i);
        }
        for (label, indices) in OverloadLabel::ALL.into_iter().zip(&class_indices) {
            if indices.len() == 1 {
                return Err(DataError::ClassTooSmall {
                    label,
                    count: indices.len(),
                });
            }
        }

        let n_classes = class_indices.iter().filter(|c| !c.is_empty()).count();
        let n_test = (self.test_fraction * n as f64).ceil() as usize;
        let n_train = n - n_test.min(n);
        if n_test < n_classes || n_train < n_classes {
            return Err(DataError::SplitTooSmall {
                n_train,
                n_test,
                n_classes,
            });
        }

        let counts: Vec<usize> = class_indices.iter().map(Vec::len).collect();
        let test_counts = allocate(&counts, n_test);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(n_train);
        let mut test = Vec::with_capacity(n_test);
        for (indices, &k) in class_indices.iter_mut().zip(&test_counts) {
            indices.shuffle(&mut rng);
            test.extend_from_slice(&indices[..k]);
            train.extend_from_slice(&indices[k..]);
        }
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        info!(n_train = train.len(), n_test = test.len(), "stratified split complete");
        Ok(TrainTestSplit {
            train: dataset.select(&train),
            test: dataset.select(&test),
        })
    }
}

/// Largest-remainder allocation of `total` slots proportional to `counts`.
fn allocate(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let mut shares: Vec<usize> = counts.iter().map(|&c| c * total / n).collect();
    let mut remainders: Vec<(usize, usize)> = counts
        .iter()
        .enumerate()
        .map(|(class, &c)| (class, c * total % n))
        .collect();
    // Stable sort keeps the lowest class index first among equal remainders.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));

    let leftover = total - shares.iter().sum::<usize>();
    for &(class, _) in remainders.iter().take(leftover) {
        shares[class] += 1;
    }
    shares
}
