//! Synthetic vehicle record generation.
//!
//! Each class draws its features from its own set of uniform ranges. Normal
//! records derive the load ratio from the drawn loads and clip it below 100%;
//! overloaded records draw the ratio directly above 100% and derive the
//! current load from it.

use rand::Rng;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::error::DataError;
use crate::record::{Dataset, OverloadLabel, VehicleRecord};

/// Half-open uniform range `[low, high)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformRange {
    pub low: f64,
    pub high: f64,
}

impl UniformRange {
    #[must_use]
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn validate(&self, field: &'static str) -> Result<(), DataError> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low >= self.high {
            return Err(DataError::InvalidRange {
                field,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        rng.gen_range(self.low..self.high)
    }
}

/// Feature ranges for well-loaded vehicles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalProfile {
    pub current_load: UniformRange,
    pub max_load: UniformRange,
    pub suspension: UniformRange,
    pub tire_pressure: UniformRange,
    pub weight: UniformRange,
    pub speed: UniformRange,
    /// Upper clip applied to the derived load ratio.
    pub ratio_cap: f64,
}

impl Default for NormalProfile {
    fn default() -> Self {
        Self {
            current_load: UniformRange::new(2.0, 8.0),
            max_load: UniformRange::new(10.0, 15.0),
            suspension: UniformRange::new(70.0, 100.0),
            tire_pressure: UniformRange::new(28.0, 35.0),
            weight: UniformRange::new(3000.0, 8000.0),
            speed: UniformRange::new(30.0, 80.0),
            ratio_cap: 95.0,
        }
    }
}

impl NormalProfile {
    fn validate(&self) -> Result<(), DataError> {
        self.current_load.validate("normal.current_load")?;
        self.max_load.validate("normal.max_load")?;
        self.suspension.validate("normal.suspension")?;
        self.tire_pressure.validate("normal.tire_pressure")?;
        self.weight.validate("normal.weight")?;
        self.speed.validate("normal.speed")
    }

    fn draw(&self, rng: &mut impl Rng) -> VehicleRecord {
        let current_load = self.current_load.sample(rng);
        let max_load = self.max_load.sample(rng);
        let suspension = self.suspension.sample(rng);
        let tire_pressure = self.tire_pressure.sample(rng);
        let weight = self.weight.sample(rng);
        let speed = self.speed.sample(rng);

        let load_ratio = (current_load / max_load * 100.0).min(self.ratio_cap);
        VehicleRecord {
            current_load: load_ratio * max_load / 100.0,
            max_load,
            load_ratio,
            suspension,
            tire_pressure,
            weight,
            speed,
            label: OverloadLabel::Normal,
        }
    }
}

/// Feature ranges for overloaded vehicles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverloadedProfile {
    pub max_load: UniformRange,
    pub suspension: UniformRange,
    pub tire_pressure: UniformRange,
    pub weight: UniformRange,
    pub speed: UniformRange,
    pub load_ratio: UniformRange,
}

impl Default for OverloadedProfile {
    fn default() -> Self {
        Self {
            max_load: UniformRange::new(10.0, 15.0),
            suspension: UniformRange::new(20.0, 60.0),
            tire_pressure: UniformRange::new(20.0, 45.0),
            weight: UniformRange::new(5000.0, 10000.0),
            speed: UniformRange::new(50.0, 120.0),
            load_ratio: UniformRange::new(105.0, 160.0),
        }
    }
}

impl OverloadedProfile {
    fn validate(&self) -> Result<(), DataError> {
        self.max_load.validate("overloaded.max_load")?;
        self.suspension.validate("overloaded.suspension")?;
        self.tire_pressure.validate("overloaded.tire_pressure")?;
        self.weight.validate("overloaded.weight")?;
        self.speed.validate("overloaded.speed")?;
        self.load_ratio.validate("overloaded.load_ratio")
    }

    fn draw(&self, rng: &mut impl Rng) -> VehicleRecord {
        let max_load = self.max_load.sample(rng);
        let suspension = self.suspension.sample(rng);
        let tire_pressure = self.tire_pressure.sample(rng);
        let weight = self.weight.sample(rng);
        let speed = self.speed.sample(rng);
        let load_ratio = self.load_ratio.sample(rng);

        VehicleRecord {
            current_load: load_ratio / 100.0 * max_load,
            max_load,
            load_ratio,
            suspension,
            tire_pressure,
            weight,
            speed,
            label: OverloadLabel::Overloaded,
        }
    }
}

/// Configuration for a balanced synthetic dataset.
///
/// # Example
///
/// ```
/// use loadcheck_data::SyntheticConfig;
///
/// let dataset = SyntheticConfig::new(100)?.with_seed(7).generate()?;
/// assert_eq!(dataset.len(), 100);
/// # Ok::<(), loadcheck_data::DataError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    n_samples: usize,
    seed: u64,
    normal: NormalProfile,
    overloaded: OverloadedProfile,
}

impl SyntheticConfig {
    /// Create a config for `n_samples` records with seed 42 and the default profiles.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidSampleCount`] when `n_samples < 2`.
    pub fn new(n_samples: usize) -> Result<Self, DataError> {
        if n_samples < 2 {
            return Err(DataError::InvalidSampleCount { n_samples });
        }
        Ok(Self {
            n_samples,
            seed: 42,
            normal: NormalProfile::default(),
            overloaded: OverloadedProfile::default(),
        })
    }

    /// Normal records use `seed`, overloaded records `seed + 1`, and the
    /// final shuffle `seed` again.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_normal_profile(mut self, profile: NormalProfile) -> Self {
        self.normal = profile;
        self
    }

    #[must_use]
    pub fn with_overloaded_profile(mut self, profile: OverloadedProfile) -> Self {
        self.overloaded = profile;
        self
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate `n_samples / 2` normal records followed by the remaining
    /// overloaded records, then shuffle them together.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::InvalidRange`] | a profile range is empty, inverted, or non-finite |
    /// | [`DataError::RatioBoundsOverlap`] | normal cap ≥ 100 or overloaded ratio low ≤ 100 |
    #[instrument(skip(self), fields(n_samples = self.n_samples, seed = self.seed))]
    pub fn generate(&self) -> Result<Dataset, DataError> {
        self.normal.validate()?;
        self.overloaded.validate()?;
        if !(self.normal.ratio_cap < 100.0 && self.overloaded.load_ratio.low > 100.0) {
            return Err(DataError::RatioBoundsOverlap {
                normal_cap: self.normal.ratio_cap,
                overloaded_low: self.overloaded.load_ratio.low,
            });
        }

        let n_normal = self.n_samples / 2;
        let n_overloaded = self.n_samples - n_normal;

        debug!(n_normal, "generating normal records");
        let mut normal_rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut records: Vec<VehicleRecord> = (0..n_normal)
            .map(|_| self.normal.draw(&mut normal_rng))
            .collect();

        debug!(n_overloaded, "generating overloaded records");
        let mut overloaded_rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(1));
        let overloaded = (0..n_overloaded).map(|_| self.overloaded.draw(&mut overloaded_rng));
        records.extend(overloaded);

        records.shuffle(&mut ChaCha8Rng::seed_from_u64(self.seed));

        info!(n_normal, n_overloaded, "synthetic dataset created");
        Ok(Dataset::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_counts_and_odd_remainder() {
        let ds = SyntheticConfig::new(101).unwrap().generate().unwrap();
        let counts = ds.class_counts();
        assert_eq!(counts.normal, 50);
        assert_eq!(counts.overloaded, 51);
    }

    #[test]
    fn ratios_respect_the_label() {
        let ds = SyntheticConfig::new(1000).unwrap().generate().unwrap();
        for r in ds.records() {
            match r.label {
                OverloadLabel::Normal => assert!(r.load_ratio <= 95.0, "{r:?}"),
                OverloadLabel::Overloaded => {
                    assert!((105.0..160.0).contains(&r.load_ratio), "{r:?}");
                }
            }
            let derived = r.current_load / r.max_load * 100.0;
            assert!((derived - r.load_ratio).abs() < 1e-9, "{r:?}");
        }
    }

    #[test]
    fn features_stay_in_profile_ranges() {
        let ds = SyntheticConfig::new(400).unwrap().generate().unwrap();
        for r in ds.records() {
            assert!((10.0..15.0).contains(&r.max_load));
            match r.label {
                OverloadLabel::Normal => {
                    assert!((70.0..100.0).contains(&r.suspension));
                    assert!((28.0..35.0).contains(&r.tire_pressure));
                    assert!((3000.0..8000.0).contains(&r.weight));
                    assert!((30.0..80.0).contains(&r.speed));
                }
                OverloadLabel::Overloaded => {
                    assert!((20.0..60.0).contains(&r.suspension));
                    assert!((20.0..45.0).contains(&r.tire_pressure));
                    assert!((5000.0..10000.0).contains(&r.weight));
                    assert!((50.0..120.0).contains(&r.speed));
                }
            }
        }
    }

    #[test]
    fn same_seed_same_dataset() {
        let a = SyntheticConfig::new(50)
            .unwrap()
            .with_seed(9)
            .generate()
            .unwrap();
        let b = SyntheticConfig::new(50)
            .unwrap()
            .with_seed(9)
            .generate()
            .unwrap();
        let c = SyntheticConfig::new(50)
            .unwrap()
            .with_seed(10)
            .generate()
            .unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn output_is_shuffled() {
        let ds = SyntheticConfig::new(200).unwrap().generate().unwrap();
        let labels = ds.labels();
        // Unshuffled output would be 100 zeros followed by 100 ones.
        assert!(labels[..100].contains(&1));
    }

    #[test]
    fn rejects_tiny_sample_counts() {
        assert!(matches!(
            SyntheticConfig::new(1),
            Err(DataError::InvalidSampleCount { n_samples: 1 })
        ));
        assert!(SyntheticConfig::new(2).is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let profile = NormalProfile {
            speed: UniformRange::new(80.0, 30.0),
            ..NormalProfile::default()
        };
        let err = SyntheticConfig::new(10)
            .unwrap()
            .with_normal_profile(profile)
            .generate()
            .unwrap_err();
        assert!(matches!(
            err,
            DataError::InvalidRange { field: "normal.speed", .. }
        ));
    }

    #[test]
    fn rejects_ratio_overlap() {
        let profile = OverloadedProfile {
            load_ratio: UniformRange::new(90.0, 160.0),
            ..OverloadedProfile::default()
        };
        let err = SyntheticConfig::new(10)
            .unwrap()
            .with_overloaded_profile(profile)
            .generate()
            .unwrap_err();
        assert!(matches!(err, DataError::RatioBoundsOverlap { .. }));
    }
}
