use async_trait::async_trait;

use crate::entities::{AlertDeliveryRecord, ModelInfo, RuntimeConfig, ScoreOutcome, Transaction};
use crate::errors::ScoringError;
use crate::value_objects::FeatureRow;

#[async_trait]
pub trait NotificationService: Send + Sync {
    fn spawn_fraud_alert(&self, config: RuntimeConfig, transaction: Transaction);
    async fn check_alert_target(&self, config: &RuntimeConfig) -> anyhow::Result<()>;
    async fn list_alert_deliveries(&self, limit: usize) -> Vec<AlertDeliveryRecord>;
    async fn last_alert_delivery(&self) -> Option<AlertDeliveryRecord>;
}

/// Inference over a loaded, immutable pipeline.
pub trait FraudScorer: Send + Sync {
    fn score(&self, row: &FeatureRow) -> Result<ScoreOutcome, ScoringError>;
    fn model_info(&self) -> ModelInfo;
}
