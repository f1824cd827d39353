use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{FixedOffset, NaiveDateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use backend_domain::{
    Catalog, CatalogRepository, DatasetRecord, SyntheticGenerator, SyntheticProfile,
};
use backend_infrastructure::{write_dataset, CatalogFileRepository, StreamSummary, TransactionSender};

pub const DEFAULT_DATASET_RECORDS: usize = 17_432;
pub const DEFAULT_STREAM_RECORDS: usize = 150;
pub const DEFAULT_STREAM_DELAY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct DatasetJob {
    pub output: PathBuf,
    pub records: usize,
    pub fraud_probability: f64,
    pub seed: Option<u64>,
    pub offset: FixedOffset,
    pub catalog_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSummary {
    pub records: usize,
    pub fraud: usize,
    pub fraud_percentage: f64,
}

#[derive(Debug, Clone)]
pub struct StreamJob {
    pub url: String,
    pub records: usize,
    pub delay: Duration,
    pub seed: Option<u64>,
    pub offset: FixedOffset,
    pub catalog_path: Option<String>,
    pub timeout_seconds: u64,
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn local_now(offset: FixedOffset) -> NaiveDateTime {
    Utc::now().with_timezone(&offset).naive_local()
}

async fn load_catalog(path: Option<&str>) -> Result<Catalog> {
    CatalogFileRepository::new().load_catalog(path).await
}

/// Generates a labelled dataset, shuffles it and writes it as CSV.
pub async fn generate_dataset(job: &DatasetJob) -> Result<DatasetSummary> {
    if !(0.0..=1.0).contains(&job.fraud_probability) {
        bail!(
            "fraud probability must be within [0, 1], got {}",
            job.fraud_probability
        );
    }
    let catalog = load_catalog(job.catalog_path.as_deref()).await?;
    let mut generator = SyntheticGenerator::new(
        catalog,
        SyntheticProfile::Dataset,
        job.offset,
        local_now(job.offset),
        rng_for(job.seed),
    )
    .with_fraud_probability(job.fraud_probability);

    let mut records: Vec<DatasetRecord> = generator
        .generate_batch(job.records)
        .into_iter()
        .map(|transaction| {
            let processed_at = transaction.processed_at_text();
            DatasetRecord::from_core(transaction.core, processed_at, transaction.is_fraud)
        })
        .collect();
    let mut shuffle_rng = rng_for(job.seed.map(|seed| seed.wrapping_add(1)));
    records.shuffle(&mut shuffle_rng);

    write_dataset(&job.output, &records)?;

    let fraud = records.iter().filter(|record| record.is_fraud).count();
    let fraud_percentage = if records.is_empty() {
        0.0
    } else {
        fraud as f64 / records.len() as f64 * 100.0
    };
    info!(
        path = %job.output.display(),
        records = records.len(),
        fraud,
        fraud_percentage = %format!("{:.2}", fraud_percentage),
        "dataset written"
    );
    Ok(DatasetSummary {
        records: records.len(),
        fraud,
        fraud_percentage,
    })
}

/// Generates transactions one at a time and posts them to the server.
pub async fn stream_transactions(job: &StreamJob) -> Result<StreamSummary> {
    let catalog = load_catalog(job.catalog_path.as_deref()).await?;
    let mut generator = SyntheticGenerator::new(
        catalog,
        SyntheticProfile::Stream,
        job.offset,
        local_now(job.offset),
        rng_for(job.seed),
    );
    let sender = TransactionSender::new(&job.url, job.timeout_seconds)?;
    info!(url = %job.url, records = job.records, "streaming transactions");

    let transactions = (0..job.records).map(|_| generator.generate());
    let summary = sender.stream(transactions, job.delay).await;
    info!(
        sent = summary.sent,
        failed = summary.failed,
        predicted_fraud = summary.predicted_fraud,
        "stream finished"
    );
    Ok(summary)
}
