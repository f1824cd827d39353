use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use backend_domain::{ModelInfo, ScoringError};

use crate::error::ModelError;
use crate::pipeline::FraudPipeline;
use crate::schema::FeatureSchema;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Self-describing model file: metadata, schema and fitted pipeline, sealed
/// with a SHA-256 over the serialized payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub model_id: String,
    pub trained_at: DateTime<Utc>,
    pub schema: FeatureSchema,
    pub pipeline: FraudPipeline,
    pub checksum: String,
}

#[derive(Serialize)]
struct ArtifactPayload<'a> {
    format_version: u32,
    model_id: &'a str,
    trained_at: &'a DateTime<Utc>,
    schema: &'a FeatureSchema,
    pipeline: &'a FraudPipeline,
}

impl ModelArtifact {
    pub fn new(schema: FeatureSchema, pipeline: FraudPipeline) -> Result<Self, ModelError> {
        let mut artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_id: Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
            schema,
            pipeline,
            checksum: String::new(),
        };
        artifact.checksum = artifact.compute_checksum()?;
        Ok(artifact)
    }

    pub fn compute_checksum(&self) -> Result<String, ModelError> {
        let payload = ArtifactPayload {
            format_version: self.format_version,
            model_id: &self.model_id,
            trained_at: &self.trained_at,
            schema: &self.schema,
            pipeline: &self.pipeline,
        };
        let bytes = serde_json::to_vec(&payload)?;
        let digest = Sha256::digest(bytes);
        let mut out = String::with_capacity(digest.len() * 2);
        for byte in digest {
            out.push_str(&format!("{:02x}", byte));
        }
        Ok(out)
    }

    pub fn verify(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat(self.format_version));
        }
        let computed = self.compute_checksum()?;
        if computed != self.checksum {
            return Err(ModelError::ChecksumMismatch {
                recorded: self.checksum.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Fails when the artifact was fit on a different column layout than
    /// the one the server derives.
    pub fn ensure_schema(&self, expected: &FeatureSchema) -> Result<(), ModelError> {
        if &self.schema != expected {
            return Err(ModelError::Scoring(ScoringError::SchemaMismatch {
                expected: expected.columns.clone(),
                found: self.schema.columns.clone(),
            }));
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes)?;
        info!(path = %path.display(), model_id = %self.model_id, "model artifact written");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let bytes = std::fs::read(path)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
        artifact.verify()?;
        info!(
            path = %path.display(),
            model_id = %artifact.model_id,
            trained_at = %artifact.trained_at,
            "model artifact loaded"
        );
        Ok(artifact)
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_id: self.model_id.clone(),
            trained_at: self.trained_at.to_rfc3339(),
            format_version: self.format_version,
            checksum: self.checksum.clone(),
            feature_columns: self.schema.columns.clone(),
            categorical_columns: self.schema.categorical.clone(),
            threshold: self.pipeline.threshold,
        }
    }
}
