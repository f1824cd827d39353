use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use backend_bootstrap::logging::{init_logging, LoggingOptions};
use backend_bootstrap::training::{run_training, TrainJob};
use backend_domain::parse_utc_offset;
use backend_infrastructure::{AppConfig, CONFIG_ENV};
use backend_model::TrainingOptions;

#[derive(Parser, Debug)]
#[command(name = "fraudlens-train")]
#[command(about = "Fit the fraud pipeline on a CSV dataset", long_about = None)]
struct Args {
    /// Path to config file; supplies defaults for output, report dir and offset
    #[arg(short, long)]
    config: Option<String>,

    /// Training dataset (CSV)
    #[arg(long, default_value = "./data/transactions.csv")]
    dataset: PathBuf,

    /// Where to write the model artifact
    #[arg(long)]
    output: Option<PathBuf>,

    /// Directory for evaluation.json / evaluation.html
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Hold-out fraction for evaluation
    #[arg(long, default_value_t = 0.35)]
    test_size: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Offset used to read naive timestamps, e.g. +02:00
    #[arg(long)]
    utc_offset: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging(&LoggingOptions::from_env(), "fraudlens-train")?;

    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var(CONFIG_ENV, config);
    }
    let config = AppConfig::load().await?;

    let offset = parse_utc_offset(args.utc_offset.as_deref().unwrap_or(&config.naive_utc_offset))?;
    if args.test_size <= 0.0 || args.test_size >= 1.0 {
        anyhow::bail!("--test-size must be between 0 and 1");
    }
    let job = TrainJob {
        dataset: args.dataset,
        output: args.output.unwrap_or_else(|| PathBuf::from(&config.model_path)),
        report_dir: args
            .report_dir
            .unwrap_or_else(|| PathBuf::from(&config.report_dir)),
        offset,
        options: TrainingOptions {
            test_size: args.test_size,
            seed: args.seed,
            ..TrainingOptions::default()
        },
    };

    let summary = run_training(&job).await?;
    info!(
        model_id = %summary.model_id,
        artifact = %summary.artifact.display(),
        report = %summary.report.html.display(),
        roc_auc = summary.evaluation.roc_auc,
        "training finished"
    );
    Ok(())
}
