use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use backend_bootstrap::datagen::{
    generate_dataset, stream_transactions, DatasetJob, StreamJob, DEFAULT_DATASET_RECORDS,
    DEFAULT_STREAM_DELAY_MS, DEFAULT_STREAM_RECORDS,
};
use backend_bootstrap::logging::{init_logging, LoggingOptions};
use backend_domain::{parse_utc_offset, DATASET_FRAUD_PROBABILITY};
use backend_infrastructure::{AppConfig, CONFIG_ENV};

#[derive(Parser, Debug)]
#[command(name = "fraudlens-datagen")]
#[command(about = "Synthetic transaction generator", long_about = None)]
struct Args {
    /// Path to config file; supplies the catalog, offset and server address
    #[arg(short, long)]
    config: Option<String>,

    /// YAML catalog overriding the built-in merchants, cities and jobs
    #[arg(long)]
    catalog: Option<String>,

    /// Local offset for generated timestamps, e.g. +02:00
    #[arg(long)]
    utc_offset: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a labelled CSV dataset for training
    Dataset {
        #[arg(long, default_value = "./data/transactions.csv")]
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_DATASET_RECORDS)]
        records: usize,

        #[arg(long, default_value_t = DATASET_FRAUD_PROBABILITY)]
        fraud_probability: f64,
    },
    /// Post transactions to a running prediction endpoint
    Stream {
        /// Prediction endpoint; defaults to the configured bind address
        #[arg(long)]
        url: Option<String>,

        #[arg(long, default_value_t = DEFAULT_STREAM_RECORDS)]
        records: usize,

        /// Pause between requests in milliseconds
        #[arg(long, default_value_t = DEFAULT_STREAM_DELAY_MS)]
        delay_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging(&LoggingOptions::from_env(), "fraudlens-datagen")?;

    let args = Args::parse();
    if let Some(config) = &args.config {
        std::env::set_var(CONFIG_ENV, config);
    }
    let config = AppConfig::load().await?;
    let offset = parse_utc_offset(args.utc_offset.as_deref().unwrap_or(&config.naive_utc_offset))?;
    let catalog_path = args.catalog.or_else(|| config.catalog_path.clone());

    match args.command {
        Command::Dataset {
            output,
            records,
            fraud_probability,
        } => {
            generate_dataset(&DatasetJob {
                output,
                records,
                fraud_probability,
                seed: args.seed,
                offset,
                catalog_path,
            })
            .await?;
        }
        Command::Stream {
            url,
            records,
            delay_ms,
        } => {
            let url =
                url.unwrap_or_else(|| format!("http://{}/api/predict/", config.bind_addr));
            stream_transactions(&StreamJob {
                url,
                records,
                delay: Duration::from_millis(delay_ms),
                seed: args.seed,
                offset,
                catalog_path,
                timeout_seconds: config.request_timeout_seconds,
            })
            .await?;
        }
    }
    Ok(())
}
