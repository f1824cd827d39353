// In-memory ports for command and query tests

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde_json::{json, Value};
use tokio::sync::{Mutex, RwLock};

use backend_domain::{
    AlertDeliveryRecord, AuditRepository, DashboardCounts, FeatureDeriver, FeatureRow,
    FraudDetection, FraudPoint, FraudScorer, ModelInfo, NotificationService, NotifierStatus,
    RegionCount, RuntimeConfig, ScoreOutcome, ScoringError, Transaction, TransactionCore,
    TransactionRepository,
};

use crate::{AppState, Metrics};

pub fn payload() -> Value {
    json!({
        "merchant": "Amazon",
        "category": "Electronics",
        "amt": 1500.0,
        "gender": "F",
        "city": "Bulawayo",
        "province": "Bulawayo",
        "latitude": -20.15,
        "longitude": 28.58,
        "city_pop": 650_000,
        "job": "Banker",
        "unix_time": 1_709_996_400,
        "merch_latitude": -17.83,
        "merch_longitude": 31.05
    })
}

pub fn runtime_config() -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        api_token: None,
        model_path: "./models/fraud_pipeline.json".to_string(),
        naive_utc_offset: FixedOffset::east_opt(2 * 3600).unwrap_or(Utc.fix()),
        catalog_path: None,
        report_dir: "./reports".to_string(),
        alert_webhook_url: None,
        alert_webhook_template: None,
        alert_webhook_token: None,
        alert_recipients: Vec::new(),
        notification_interval_seconds: 60,
        notification_batch_size: 100,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 5,
    }
}

#[derive(Default)]
pub struct InMemoryTransactions {
    rows: Mutex<Vec<Transaction>>,
}

impl InMemoryTransactions {
    pub async fn snapshot(&self) -> Vec<Transaction> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactions {
    async fn ensure_schema(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn insert_transaction(
        &self,
        core: &TransactionCore,
        processed_at: DateTime<Utc>,
    ) -> anyhow::Result<Transaction> {
        let mut rows = self.rows.lock().await;
        let transaction = Transaction {
            transaction_id: rows.len() as i64 + 1,
            core: core.clone(),
            processed_at,
            is_fraud: false,
            notification_sent: false,
            scored_at: None,
        };
        rows.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_fraud_flag(
        &self,
        transaction_id: i64,
        is_fraud: bool,
        scored_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.transaction_id == transaction_id)
            .ok_or_else(|| anyhow::anyhow!("transaction {} missing", transaction_id))?;
        row.is_fraud = is_fraud;
        row.scored_at = Some(scored_at);
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: i64) -> anyhow::Result<Option<Transaction>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|row| row.transaction_id == transaction_id)
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> anyhow::Result<Vec<Transaction>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }

    async fn count_transactions(&self) -> anyhow::Result<u64> {
        Ok(self.rows.lock().await.len() as u64)
    }

    async fn fetch_unnotified_fraud(&self, limit: usize) -> anyhow::Result<Vec<Transaction>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| row.is_fraud && !row.notification_sent)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_notified(&self, transaction_ids: &[i64]) -> anyhow::Result<u64> {
        let mut rows = self.rows.lock().await;
        let mut updated = 0;
        for row in rows.iter_mut() {
            if transaction_ids.contains(&row.transaction_id) && !row.notification_sent {
                row.notification_sent = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn fetch_dashboard_counts(&self) -> anyhow::Result<DashboardCounts> {
        let rows = self.rows.lock().await;
        let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
        for row in rows.iter() {
            *by_category.entry(row.core.category.clone()).or_default() += 1;
        }
        Ok(DashboardCounts {
            total: rows.len() as u64,
            fraud: rows.iter().filter(|row| row.is_fraud).count() as u64,
            by_category: by_category.into_iter().collect(),
        })
    }

    async fn fetch_fraud_points(&self) -> anyhow::Result<Vec<FraudPoint>> {
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| row.is_fraud)
            .map(|row| FraudPoint {
                latitude: row.core.latitude,
                longitude: row.core.longitude,
                province: row.core.province.clone(),
            })
            .collect())
    }

    async fn fetch_fraud_by_region(&self) -> anyhow::Result<Vec<RegionCount>> {
        let rows = self.rows.lock().await;
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for row in rows.iter().filter(|row| row.is_fraud) {
            *counts.entry(row.core.province.clone()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(province, count)| RegionCount { province, count })
            .collect())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAudit {
    rows: Mutex<Vec<FraudDetection>>,
}

impl InMemoryAudit {
    pub async fn snapshot(&self) -> Vec<FraudDetection> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAudit {
    async fn insert_detection(
        &self,
        user_id: i64,
        result: bool,
        date_time: DateTime<Utc>,
    ) -> anyhow::Result<FraudDetection> {
        let mut rows = self.rows.lock().await;
        let detection = FraudDetection {
            fraud_detection_id: rows.len() as i64 + 1,
            user_id,
            result,
            date_time,
        };
        rows.push(detection.clone());
        Ok(detection)
    }

    async fn list_detections(&self, limit: usize) -> anyhow::Result<Vec<FraudDetection>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().rev().take(limit).cloned().collect())
    }
}

/// Audit store whose writes always fail.
pub struct FailingAudit;

#[async_trait]
impl AuditRepository for FailingAudit {
    async fn insert_detection(
        &self,
        _user_id: i64,
        _result: bool,
        _date_time: DateTime<Utc>,
    ) -> anyhow::Result<FraudDetection> {
        anyhow::bail!("audit store unavailable")
    }

    async fn list_detections(&self, _limit: usize) -> anyhow::Result<Vec<FraudDetection>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerted: std::sync::Mutex<Vec<i64>>,
}

impl RecordingNotifier {
    pub async fn alerted_ids(&self) -> Vec<i64> {
        self.alerted
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl NotificationService for RecordingNotifier {
    fn spawn_fraud_alert(&self, _config: RuntimeConfig, transaction: Transaction) {
        if let Ok(mut ids) = self.alerted.lock() {
            ids.push(transaction.transaction_id);
        }
    }

    async fn check_alert_target(&self, _config: &RuntimeConfig) -> anyhow::Result<()> {
        Ok(())
    }

    async fn list_alert_deliveries(&self, _limit: usize) -> Vec<AlertDeliveryRecord> {
        Vec::new()
    }

    async fn last_alert_delivery(&self) -> Option<AlertDeliveryRecord> {
        None
    }
}

pub struct FixedScorer {
    outcome: Option<ScoreOutcome>,
}

impl FixedScorer {
    pub fn fraud() -> Self {
        Self {
            outcome: Some(ScoreOutcome {
                probability: 0.97,
                is_fraud: true,
            }),
        }
    }

    pub fn legit() -> Self {
        Self {
            outcome: Some(ScoreOutcome {
                probability: 0.02,
                is_fraud: false,
            }),
        }
    }

    pub fn failing() -> Self {
        Self { outcome: None }
    }
}

impl FraudScorer for FixedScorer {
    fn score(&self, row: &FeatureRow) -> Result<ScoreOutcome, ScoringError> {
        self.outcome.ok_or_else(|| ScoringError::SchemaMismatch {
            expected: vec!["amt".to_string()],
            found: row.names(),
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_id: "fixed".to_string(),
            trained_at: "2024-01-01T00:00:00+00:00".to_string(),
            format_version: 1,
            checksum: String::new(),
            feature_columns: Vec::new(),
            categorical_columns: Vec::new(),
            threshold: 0.5,
        }
    }
}

pub struct Harness {
    pub state: AppState,
    pub transactions: Arc<InMemoryTransactions>,
    pub audit: Arc<InMemoryAudit>,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn test_state(scorer: FixedScorer) -> Harness {
    let config = runtime_config();
    let transactions = Arc::new(InMemoryTransactions::default());
    let audit = Arc::new(InMemoryAudit::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState {
        deriver: FeatureDeriver::new(config.naive_utc_offset),
        config,
        transaction_repo: transactions.clone(),
        audit_repo: audit.clone(),
        notification_service: notifier.clone(),
        scorer: Arc::new(scorer),
        metrics: Arc::new(Metrics::default()),
        notifier_status: Arc::new(RwLock::new(NotifierStatus::default())),
    };
    Harness {
        state,
        transactions,
        audit,
        notifier,
    }
}
