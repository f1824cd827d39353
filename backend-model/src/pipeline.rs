use serde::{Deserialize, Serialize};

use backend_domain::{FeatureRow, ScoringError};

use crate::logistic::LogisticRegression;
use crate::preprocessor::ColumnTransformer;

pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Fitted preprocessing plus classifier. Oversampling is a training-time
/// step only and is not part of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudPipeline {
    pub preprocessor: ColumnTransformer,
    pub classifier: LogisticRegression,
    pub threshold: f64,
}

impl FraudPipeline {
    pub fn predict_proba(&self, row: &FeatureRow) -> Result<f64, ScoringError> {
        let encoded = self.preprocessor.transform(row)?;
        Ok(self.classifier.predict_proba(&encoded))
    }

    pub fn predict(&self, row: &FeatureRow) -> Result<u8, ScoringError> {
        Ok(u8::from(self.predict_proba(row)? > self.threshold))
    }
}
