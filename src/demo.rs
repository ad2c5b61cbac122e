//! Fixed vehicle readings scored after training for a manual sanity check.

use anyhow::{Context, Result};

use loadcheck_data::{OverloadLabel, StandardScaler, VehicleReading};
use loadcheck_rf::RandomForest;

pub struct DemoCase {
    pub name: &'static str,
    pub reading: VehicleReading,
}

pub const DEMO_CASES: [DemoCase; 4] = [
    DemoCase {
        name: "Normal Vehicle",
        reading: VehicleReading {
            current_load: 8.0,
            max_load: 12.0,
            suspension: 85.0,
            tire_pressure: 32.0,
            weight: 5000.0,
            speed: 60.0,
        },
    },
    DemoCase {
        name: "Slightly Overloaded",
        reading: VehicleReading {
            current_load: 13.0,
            max_load: 12.0,
            suspension: 70.0,
            tire_pressure: 30.0,
            weight: 6000.0,
            speed: 75.0,
        },
    },
    DemoCase {
        name: "Severely Overloaded",
        reading: VehicleReading {
            current_load: 18.0,
            max_load: 12.0,
            suspension: 40.0,
            tire_pressure: 25.0,
            weight: 8000.0,
            speed: 90.0,
        },
    },
    DemoCase {
        name: "Borderline Case",
        reading: VehicleReading {
            current_load: 11.5,
            max_load: 12.0,
            suspension: 65.0,
            tire_pressure: 28.0,
            weight: 5500.0,
            speed: 70.0,
        },
    },
];

pub struct DemoPrediction<'a> {
    pub case: &'a DemoCase,
    pub label: OverloadLabel,
    pub p_normal: f64,
    pub p_overloaded: f64,
}

/// Scale each reading with the training scaler and score it.
pub fn predict_cases<'a>(
    forest: &RandomForest,
    scaler: &StandardScaler,
    cases: &'a [DemoCase],
) -> Result<Vec<DemoPrediction<'a>>> {
    cases
        .iter()
        .map(|case| {
            let scaled = scaler
                .transform_row(&case.reading.features())
                .with_context(|| format!("failed to scale demo case {:?}", case.name))?;
            let dist = forest
                .predict_proba(&scaled)
                .with_context(|| format!("failed to predict demo case {:?}", case.name))?;
            let label = OverloadLabel::from_class_index(dist.predicted_class())
                .context("forest predicted a class outside the overload labels")?;
            Ok(DemoPrediction {
                case,
                label,
                p_normal: dist.probability(OverloadLabel::Normal.class_index()),
                p_overloaded: dist.probability(OverloadLabel::Overloaded.class_index()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use loadcheck_data::{FEATURE_NAMES, SyntheticConfig};
    use loadcheck_rf::RandomForestConfig;

    use super::*;

    #[test]
    fn clear_cases_are_classified() {
        let ds = SyntheticConfig::new(400).unwrap().generate().unwrap();
        let (scaler, x) = StandardScaler::fit_transform(&ds.features()).unwrap();
        let names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        let forest = RandomForestConfig::new(30)
            .unwrap()
            .with_max_depth(Some(10))
            .fit(&x, &ds.labels(), &names)
            .unwrap()
            .into_forest();

        let predictions = predict_cases(&forest, &scaler, &DEMO_CASES).unwrap();
        assert_eq!(predictions.len(), 4);
        assert_eq!(predictions[0].label, OverloadLabel::Normal);
        assert_eq!(predictions[2].label, OverloadLabel::Overloaded);
        for p in &predictions {
            assert!((p.p_normal + p.p_overloaded - 1.0).abs() < 1e-9);
        }
    }
}
