use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::FixedOffset;
use tracing::{info, warn};

use backend_domain::FeatureDeriver;
use backend_infrastructure::{read_dataset, write_evaluation_report, ReportPaths};
use backend_model::training::{rows_from_records, SampleCounts};
use backend_model::{train_pipeline, EvaluationReport, ModelArtifact, TrainingOptions};

#[derive(Debug, Clone)]
pub struct TrainJob {
    pub dataset: PathBuf,
    pub output: PathBuf,
    pub report_dir: PathBuf,
    pub offset: FixedOffset,
    pub options: TrainingOptions,
}

#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub model_id: String,
    pub artifact: PathBuf,
    pub report: ReportPaths,
    pub counts: SampleCounts,
    pub evaluation: EvaluationReport,
}

/// Reads the dataset, fits the pipeline, writes the evaluation report and
/// the artifact.
pub async fn run_training(job: &TrainJob) -> Result<TrainSummary> {
    let records = read_dataset(&job.dataset)?;
    let deriver = FeatureDeriver::new(job.offset);
    let (rows, labels, skipped) = rows_from_records(&records, &deriver);
    if skipped > 0 {
        warn!(skipped, "rows with unparseable processed_at were skipped");
    }
    if rows.is_empty() {
        bail!("dataset {} has no usable rows", job.dataset.display());
    }

    let outcome = train_pipeline(&rows, &labels, job.options)?;
    let matrix = outcome.evaluation.confusion_matrix;
    info!(
        roc_auc = outcome.evaluation.roc_auc,
        average_precision = outcome.evaluation.average_precision,
        accuracy = outcome.evaluation.classification.accuracy,
        tn = matrix.true_negative,
        fp = matrix.false_positive,
        fn_ = matrix.false_negative,
        tp = matrix.true_positive,
        "model evaluated"
    );

    let artifact = ModelArtifact::new(outcome.schema, outcome.pipeline)?;
    let report = write_evaluation_report(
        &job.report_dir,
        &artifact.info(),
        &outcome.counts,
        &outcome.evaluation,
    )
    .await?;
    artifact.save(&job.output)?;

    Ok(TrainSummary {
        model_id: artifact.model_id,
        artifact: job.output.clone(),
        report,
        counts: outcome.counts,
        evaluation: outcome.evaluation,
    })
}
