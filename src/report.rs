//! Human-readable pipeline report on stdout.

use std::io::{self, Write};
use std::path::Path;

use loadcheck_data::{Dataset, OverloadLabel, TrainTestSplit};
use loadcheck_rf::{BinaryMetrics, ConfusionMatrix, RankedFeature, TrainingSummary};

use crate::demo::DemoPrediction;

const RULE_WIDTH: usize = 60;

pub fn section(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

pub fn dataset(out: &mut impl Write, dataset: &Dataset, source: &str) -> io::Result<()> {
    let counts = dataset.class_counts();
    writeln!(out, "Source: {source}")?;
    writeln!(out, "Total samples: {}", dataset.len())?;
    writeln!(out, "Normal vehicles: {}", counts.normal)?;
    writeln!(out, "Overloaded vehicles: {}", counts.overloaded)?;
    writeln!(out)?;
    writeln!(out, "Dataset statistics:")?;
    write!(out, "{}", dataset.describe())
}

pub fn split(
    out: &mut impl Write,
    split: &TrainTestSplit,
    n_features: usize,
    test_fraction: f64,
) -> io::Result<()> {
    let n = split.train.len() + split.test.len();
    writeln!(out, "Features shape: ({n}, {n_features})")?;
    writeln!(out, "Labels shape: ({n},)")?;
    writeln!(
        out,
        "Split: train {:.0}%, test {:.0}% (stratified)",
        (1.0 - test_fraction) * 100.0,
        test_fraction * 100.0
    )?;
    writeln!(out, "Training set: {} samples", split.train.len())?;
    writeln!(out, "Test set: {} samples", split.test.len())
}

pub fn training(out: &mut impl Write, summary: &TrainingSummary) -> io::Result<()> {
    let count = |label: OverloadLabel| {
        summary
            .class_counts
            .get(label.class_index())
            .copied()
            .unwrap_or(0)
    };
    writeln!(
        out,
        "Trained on {} samples ({} normal, {} overloaded) in {:.2}s",
        summary.n_samples,
        count(OverloadLabel::Normal),
        count(OverloadLabel::Overloaded),
        summary.elapsed.as_secs_f64()
    )?;
    writeln!(out, "  - features per split: {}", summary.features_per_split)?;
    writeln!(
        out,
        "  - tree depth: mean {:.1}, max {}",
        summary.mean_depth, summary.max_depth_reached
    )?;
    writeln!(out, "  - leaves per tree: mean {:.1}", summary.mean_leaves)
}

pub fn metrics(out: &mut impl Write, metrics: &BinaryMetrics) -> io::Result<()> {
    writeln!(out, "Model Performance Metrics:")?;
    writeln!(
        out,
        "  Accuracy:  {:.4} ({:.2}%)",
        metrics.accuracy,
        metrics.accuracy * 100.0
    )?;
    writeln!(out, "  Precision: {:.4}", metrics.precision)?;
    writeln!(out, "  Recall:    {:.4}", metrics.recall)?;
    writeln!(out, "  F1-Score:  {:.4}", metrics.f1)
}

/// Two-class confusion matrix with `Normal`/`Overloaded` axes.
pub fn confusion(out: &mut impl Write, cm: &ConfusionMatrix) -> io::Result<()> {
    let rows = cm.as_rows();
    let cell = |t: usize, p: usize| rows.get(t).and_then(|r| r.get(p)).copied().unwrap_or(0);
    writeln!(out, "Confusion Matrix:")?;
    writeln!(out, "                Predicted")?;
    writeln!(out, "              Normal  Overloaded")?;
    writeln!(out, "Actual Normal    {:4}      {:4}", cell(0, 0), cell(0, 1))?;
    writeln!(out, "      Overloaded {:4}      {:4}", cell(1, 0), cell(1, 1))
}

pub fn importances(out: &mut impl Write, ranked: &[RankedFeature]) -> io::Result<()> {
    writeln!(out, "Feature importances (mean decrease in impurity):")?;
    for f in ranked {
        writeln!(out, "  {:>2}. {:<14} {:.4}", f.rank, f.name, f.importance)?;
    }
    Ok(())
}

pub fn artifacts(
    out: &mut impl Write,
    model: &Path,
    scaler: &Path,
    config: &Path,
) -> io::Result<()> {
    writeln!(out, "All artifacts saved successfully!")?;
    writeln!(out, "  - Model: {}", model.display())?;
    writeln!(out, "  - Scaler: {}", scaler.display())?;
    writeln!(out, "  - Config: {}", config.display())
}

pub fn demo(out: &mut impl Write, predictions: &[DemoPrediction<'_>]) -> io::Result<()> {
    writeln!(out, "Test Case Predictions:")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    for (i, p) in predictions.iter().enumerate() {
        let r = &p.case.reading;
        writeln!(out)?;
        writeln!(out, "Test Case {}: {}", i + 1, p.case.name)?;
        writeln!(out, "  Features:")?;
        writeln!(out, "    Current Load: {:.2} tons", r.current_load)?;
        writeln!(out, "    Max Load: {:.2} tons", r.max_load)?;
        writeln!(out, "    Load Ratio: {:.2}%", r.load_ratio())?;
        writeln!(out, "    Suspension: {}%", r.suspension)?;
        writeln!(out, "    Tire Pressure: {} PSI", r.tire_pressure)?;
        writeln!(out, "    Weight: {} kg", r.weight)?;
        writeln!(out, "    Speed: {} km/h", r.speed)?;
        writeln!(out, "  Prediction: {}", p.label.name().to_uppercase())?;
        writeln!(
            out,
            "  Confidence: {:.2}% (overloaded), {:.2}% (normal)",
            p.p_overloaded * 100.0,
            p.p_normal * 100.0
        )?;
    }
    Ok(())
}
