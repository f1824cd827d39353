use serde::{Deserialize, Serialize};
use tracing::info;

use backend_domain::{DatasetRecord, FeatureDeriver, FeatureRow, ProcessedAt};

use crate::error::ModelError;
use crate::evaluation::EvaluationReport;
use crate::logistic::{LogisticOptions, LogisticRegression};
use crate::pipeline::{FraudPipeline, DEFAULT_THRESHOLD};
use crate::preprocessor::ColumnTransformer;
use crate::schema::FeatureSchema;
use crate::smote::{Smote, DEFAULT_NEIGHBOURS};
use crate::split::stratified_split;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingOptions {
    pub test_size: f64,
    pub seed: u64,
    pub smote_neighbours: usize,
    pub logistic: LogisticOptions,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            test_size: 0.35,
            seed: 42,
            smote_neighbours: DEFAULT_NEIGHBOURS,
            logistic: LogisticOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleCounts {
    pub total: usize,
    pub train: usize,
    pub test: usize,
    pub resampled_train: usize,
    pub train_fraud: usize,
    pub test_fraud: usize,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub schema: FeatureSchema,
    pub pipeline: FraudPipeline,
    pub evaluation: EvaluationReport,
    pub counts: SampleCounts,
}

/// Turns dataset rows into feature rows and labels. Rows whose
/// `processed_at` cannot be parsed are skipped and counted.
pub fn rows_from_records(
    records: &[DatasetRecord],
    deriver: &FeatureDeriver,
) -> (Vec<FeatureRow>, Vec<u8>, usize) {
    let mut rows = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match ProcessedAt::parse(&record.processed_at) {
            Some(processed_at) => {
                rows.push(deriver.feature_row(&record.core(), &processed_at));
                labels.push(u8::from(record.is_fraud));
            }
            None => skipped += 1,
        }
    }
    (rows, labels, skipped)
}

/// Split, fit the column transformer on the training side, oversample,
/// fit the classifier and evaluate on the untouched test side.
pub fn train_pipeline(
    rows: &[FeatureRow],
    labels: &[u8],
    options: TrainingOptions,
) -> Result<TrainingOutcome, ModelError> {
    if rows.is_empty() {
        return Err(ModelError::EmptyDataset);
    }
    if rows.len() != labels.len() {
        return Err(ModelError::DimensionMismatch {
            expected: rows.len(),
            found: labels.len(),
        });
    }
    let schema = FeatureSchema::default();

    let (train_idx, test_idx) = stratified_split(labels, options.test_size, options.seed);
    let train_rows: Vec<FeatureRow> = train_idx.iter().map(|idx| rows[*idx].clone()).collect();
    let train_labels: Vec<u8> = train_idx.iter().map(|idx| labels[*idx]).collect();
    let test_rows: Vec<FeatureRow> = test_idx.iter().map(|idx| rows[*idx].clone()).collect();
    let test_labels: Vec<u8> = test_idx.iter().map(|idx| labels[*idx]).collect();

    let preprocessor = ColumnTransformer::fit(&schema, &train_rows)?;
    let encoded_train = preprocessor.transform_all(&train_rows)?;
    info!(
        train = train_rows.len(),
        test = test_rows.len(),
        encoded_width = preprocessor.output_dim(),
        "preprocessing fitted"
    );

    let smote = Smote {
        k_neighbours: options.smote_neighbours,
        seed: options.seed,
    };
    let (resampled_rows, resampled_labels) = smote.fit_resample(&encoded_train, &train_labels)?;
    info!(rows = resampled_rows.len(), "minority class oversampled");

    let classifier = LogisticRegression::fit(&resampled_rows, &resampled_labels, options.logistic)?;
    info!(
        iterations = classifier.iterations,
        converged = classifier.converged,
        "classifier fitted"
    );

    let pipeline = FraudPipeline {
        preprocessor,
        classifier,
        threshold: DEFAULT_THRESHOLD,
    };
    let scores = test_rows
        .iter()
        .map(|row| pipeline.predict_proba(row))
        .collect::<Result<Vec<_>, _>>()?;
    let evaluation = EvaluationReport::evaluate(&test_labels, &scores, pipeline.threshold);

    let counts = SampleCounts {
        total: rows.len(),
        train: train_rows.len(),
        test: test_rows.len(),
        resampled_train: resampled_rows.len(),
        train_fraud: train_labels.iter().filter(|l| **l == 1).count(),
        test_fraud: test_labels.iter().filter(|l| **l == 1).count(),
    };

    Ok(TrainingOutcome {
        schema,
        pipeline,
        evaluation,
        counts,
    })
}
