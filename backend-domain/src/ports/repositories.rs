use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    DashboardCounts, FraudDetection, FraudPoint, RegionCount, Transaction, TransactionCore,
};
use crate::services::Catalog;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn insert_transaction(
        &self,
        core: &TransactionCore,
        processed_at: DateTime<Utc>,
    ) -> anyhow::Result<Transaction>;
    async fn update_fraud_flag(
        &self,
        transaction_id: i64,
        is_fraud: bool,
        scored_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn get_transaction(&self, transaction_id: i64) -> anyhow::Result<Option<Transaction>>;
    async fn list_recent(&self, limit: usize) -> anyhow::Result<Vec<Transaction>>;
    async fn count_transactions(&self) -> anyhow::Result<u64>;
    async fn fetch_unnotified_fraud(&self, limit: usize) -> anyhow::Result<Vec<Transaction>>;
    async fn mark_notified(&self, transaction_ids: &[i64]) -> anyhow::Result<u64>;
    async fn fetch_dashboard_counts(&self) -> anyhow::Result<DashboardCounts>;
    async fn fetch_fraud_points(&self) -> anyhow::Result<Vec<FraudPoint>>;
    async fn fetch_fraud_by_region(&self) -> anyhow::Result<Vec<RegionCount>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert_detection(
        &self,
        user_id: i64,
        result: bool,
        date_time: DateTime<Utc>,
    ) -> anyhow::Result<FraudDetection>;
    async fn list_detections(&self, limit: usize) -> anyhow::Result<Vec<FraudDetection>>;
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn load_catalog(&self, path: Option<&str>) -> anyhow::Result<Catalog>;
}
