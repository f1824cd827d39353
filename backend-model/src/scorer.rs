use std::path::Path;

use backend_domain::{FeatureRow, FraudScorer, ModelInfo, ScoreOutcome, ScoringError};

use crate::artifact::ModelArtifact;
use crate::error::ModelError;
use crate::schema::FeatureSchema;

/// `FraudScorer` backed by a verified artifact.
pub struct PipelineScorer {
    artifact: ModelArtifact,
}

impl PipelineScorer {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Loads, verifies the checksum and checks the schema against the
    /// columns the server derives.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let artifact = ModelArtifact::load(path)?;
        artifact.ensure_schema(&FeatureSchema::default())?;
        Ok(Self::new(artifact))
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl FraudScorer for PipelineScorer {
    fn score(&self, row: &FeatureRow) -> Result<ScoreOutcome, ScoringError> {
        self.artifact.schema.check(row)?;
        let probability = self.artifact.pipeline.predict_proba(row)?;
        Ok(ScoreOutcome {
            probability,
            is_fraud: probability > self.artifact.pipeline.threshold,
        })
    }

    fn model_info(&self) -> ModelInfo {
        self.artifact.info()
    }
}
