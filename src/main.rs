use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

use loadcheck_data::{
    Dataset, DatasetReader, DatasetWriter, FEATURE_NAMES, OverloadLabel, StandardScaler,
    StratifiedSplit, SyntheticConfig, validate,
};
use loadcheck_io::{ArtifactWriter, EvaluationMetrics, ModelConfig, ModelParameters};
use loadcheck_rf::{ConfusionMatrix, RandomForest, RandomForestConfig};

mod demo;
mod report;

#[derive(Parser)]
#[command(name = "loadcheck")]
#[command(about = "Train a vehicle overload classifier on synthetic load data")]
#[command(version)]
struct Cli {
    /// Directory for the model, scaler and configuration files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// RNG seed for data generation, splitting and training
    #[arg(long, default_value_t = PipelineConfig::SEED)]
    seed: u64,

    /// Number of synthetic records to generate
    #[arg(long, default_value_t = PipelineConfig::N_SAMPLES)]
    n_samples: usize,

    /// Train on this CSV file instead of synthetic data
    #[arg(long)]
    data: Option<PathBuf>,

    /// Also write the training dataset to this CSV file
    #[arg(long)]
    export_data: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

/// Everything one training run needs.
struct PipelineConfig {
    output_dir: PathBuf,
    seed: u64,
    n_samples: usize,
    data: Option<PathBuf>,
    export_data: Option<PathBuf>,
}

impl PipelineConfig {
    const SEED: u64 = 42;
    const N_SAMPLES: usize = 1000;
    const TEST_FRACTION: f64 = 0.2;
    const N_ESTIMATORS: usize = 100;
    const MAX_DEPTH: usize = 10;

    fn from_cli(cli: &Cli) -> Self {
        Self {
            output_dir: cli.output_dir.clone(),
            seed: cli.seed,
            n_samples: cli.n_samples,
            data: cli.data.clone(),
            export_data: cli.export_data.clone(),
        }
    }
}

fn load_dataset(config: &PipelineConfig) -> Result<(Dataset, String)> {
    match &config.data {
        Some(path) => {
            let dataset = DatasetReader::new(path)
                .read()
                .with_context(|| format!("failed to read dataset {}", path.display()))?;
            Ok((dataset, path.display().to_string()))
        }
        None => {
            let dataset = SyntheticConfig::new(config.n_samples)
                .context("invalid synthetic dataset size")?
                .with_seed(config.seed)
                .generate()
                .context("synthetic data generation failed")?;
            Ok((dataset, format!("synthetic (seed {})", config.seed)))
        }
    }
}

/// Where [`save_artifacts`] put each file.
struct SavedArtifacts {
    model: PathBuf,
    scaler: PathBuf,
    config: PathBuf,
}

/// Create the output directory, then write model, scaler and configuration.
fn save_artifacts(
    output_dir: &Path,
    forest: &RandomForest,
    scaler: &StandardScaler,
    model_config: &ModelConfig,
) -> Result<SavedArtifacts> {
    let writer = ArtifactWriter::new(output_dir).context("failed to prepare output directory")?;
    forest
        .save(writer.model_path())
        .context("failed to save model")?;
    scaler
        .save(writer.scaler_path())
        .context("failed to save scaler")?;
    let config = writer
        .write_config(model_config)
        .context("failed to save model configuration")?;
    Ok(SavedArtifacts {
        model: writer.model_path(),
        scaler: writer.scaler_path(),
        config,
    })
}

fn run(config: &PipelineConfig, out: &mut impl Write) -> Result<()> {
    report::section(out, "Vehicle Overload Detection Model Training")?;
    writeln!(out, "Started at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;

    // 1. Data
    report::section(out, "Creating Training Dataset")?;
    let (dataset, source) = load_dataset(config)?;
    report::dataset(out, &dataset, &source)?;

    if let Some(path) = &config.export_data {
        DatasetWriter::new(path)
            .write(&dataset)
            .with_context(|| format!("failed to export dataset to {}", path.display()))?;
        writeln!(out, "Dataset exported to {}", path.display())?;
    }

    validate(&dataset).context("dataset validation failed")?;
    writeln!(out, "Dataset validation passed!")?;

    // 2. Split and scale
    report::section(out, "Preparing Features and Labels")?;
    let split = StratifiedSplit::new(PipelineConfig::TEST_FRACTION)
        .context("invalid test fraction")?
        .with_seed(config.seed)
        .split(&dataset)
        .context("train/test split failed")?;
    report::split(
        out,
        &split,
        FEATURE_NAMES.len(),
        PipelineConfig::TEST_FRACTION,
    )?;

    let (scaler, train_x) = StandardScaler::fit_transform(&split.train.features())
        .context("failed to fit scaler")?;
    let test_x = scaler
        .transform(&split.test.features())
        .context("failed to scale test set")?;
    writeln!(out, "Data normalization completed (StandardScaler)")?;

    // 3. Train
    report::section(out, "Training Random Forest Classifier")?;
    writeln!(out, "Model parameters:")?;
    writeln!(out, "  - n_estimators: {}", PipelineConfig::N_ESTIMATORS)?;
    writeln!(out, "  - max_depth: {}", PipelineConfig::MAX_DEPTH)?;
    writeln!(out, "  - random_state: {}", config.seed)?;

    let feature_names: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    let result = RandomForestConfig::new(PipelineConfig::N_ESTIMATORS)
        .context("invalid forest configuration")?
        .with_max_depth(Some(PipelineConfig::MAX_DEPTH))
        .with_seed(config.seed)
        .fit(&train_x, &split.train.labels(), &feature_names)
        .context("Random Forest training failed")?;
    let forest = result.forest();
    writeln!(out, "Model training completed!")?;
    report::training(out, result.summary())?;

    // 4. Evaluate
    report::section(out, "Evaluating Model on Test Set")?;
    let predicted = forest
        .predict_batch(&test_x)
        .context("test set prediction failed")?;
    let n_classes = OverloadLabel::ALL.len();
    let cm = ConfusionMatrix::from_labels(&split.test.labels(), &predicted, n_classes)
        .context("failed to build confusion matrix")?;
    let metrics = cm.binary_metrics(OverloadLabel::Overloaded.class_index());
    info!(
        accuracy = metrics.accuracy,
        precision = metrics.precision,
        recall = metrics.recall,
        f1 = metrics.f1,
        "evaluation complete"
    );

    report::metrics(out, &metrics)?;
    writeln!(out)?;
    report::confusion(out, &cm)?;
    writeln!(out)?;
    writeln!(out, "Detailed Classification Report:")?;
    let class_names = OverloadLabel::ALL.map(OverloadLabel::name);
    write!(out, "{}", cm.report(&class_names))?;
    writeln!(out)?;
    report::importances(out, result.importances())?;

    // 5. Persist
    report::section(out, "Saving Model Artifacts")?;
    let model_config = ModelConfig::new(
        ModelParameters {
            n_estimators: PipelineConfig::N_ESTIMATORS,
            max_depth: Some(PipelineConfig::MAX_DEPTH),
            random_state: config.seed,
        },
        feature_names,
        Local::now().naive_local(),
        EvaluationMetrics {
            accuracy: metrics.accuracy,
            precision: metrics.precision,
            recall: metrics.recall,
            f1_score: metrics.f1,
            confusion_matrix: cm.as_rows().to_vec(),
        },
    );
    let saved = save_artifacts(&config.output_dir, forest, &scaler, &model_config)
        .inspect_err(|e| error!(error = %format!("{e:#}"), "failed to save artifacts"))?;
    report::artifacts(out, &saved.model, &saved.scaler, &saved.config)?;

    // 6. Demo predictions
    report::section(out, "Testing Model Predictions")?;
    let predictions = demo::predict_cases(forest, &scaler, &demo::DEMO_CASES)?;
    report::demo(out, &predictions)?;

    report::section(out, "Training Pipeline Completed Successfully!")?;
    writeln!(out, "Completed at: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let config = PipelineConfig::from_cli(&cli);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&config, &mut out)
        .inspect_err(|e| error!(error = %format!("{e:#}"), "training pipeline failed"))
}
