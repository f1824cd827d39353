use std::sync::Arc;

use backend_domain::ports::{AuditRepository, FraudScorer, NotificationService, TransactionRepository};
use backend_domain::services::FeatureDeriver;
use backend_domain::{NotifierStatus, RuntimeConfig};
use tokio::sync::RwLock;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub transaction_repo: Arc<dyn TransactionRepository>,
    pub audit_repo: Arc<dyn AuditRepository>,
    pub notification_service: Arc<dyn NotificationService>,
    pub scorer: Arc<dyn FraudScorer>,
    pub deriver: FeatureDeriver,
    pub metrics: Arc<Metrics>,
    pub notifier_status: Arc<RwLock<NotifierStatus>>,
}
