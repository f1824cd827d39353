use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use tracing::info;

use backend_domain::ports::{AuditRepository, TransactionRepository};
use backend_domain::{
    DashboardCounts, DbConfig, FraudDetection, FraudPoint, RegionCount, Transaction,
    TransactionCore,
};

const TRANSACTION_COLUMNS: &str = "transaction_id, merchant, category, amt, gender, city, \
    province, latitude, longitude, city_pop, job, unix_time, merch_latitude, merch_longitude, \
    processed_at, is_fraud, notification_sent, scored_at";

const SCHEMA: [&str; 5] = [
    r#"
CREATE TABLE IF NOT EXISTS transactions (
    transaction_id INTEGER PRIMARY KEY AUTOINCREMENT,
    merchant TEXT NOT NULL,
    category TEXT NOT NULL,
    amt REAL NOT NULL CHECK (amt > 0),
    gender TEXT NOT NULL,
    city TEXT NOT NULL,
    province TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    city_pop INTEGER NOT NULL,
    job TEXT NOT NULL,
    unix_time INTEGER NOT NULL,
    merch_latitude REAL NOT NULL,
    merch_longitude REAL NOT NULL,
    processed_at TEXT NOT NULL,
    is_fraud INTEGER NOT NULL DEFAULT 0,
    notification_sent INTEGER NOT NULL DEFAULT 0,
    scored_at TEXT NULL
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_transactions_processed_at ON transactions (processed_at)",
    "CREATE INDEX IF NOT EXISTS idx_transactions_pending_alert ON transactions (is_fraud, notification_sent)",
    r#"
CREATE TABLE IF NOT EXISTS fraud_detections (
    fraud_detection_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    result INTEGER NOT NULL,
    date_time TEXT NOT NULL
)
"#,
    "CREATE INDEX IF NOT EXISTS idx_fraud_detections_date_time ON fraud_detections (date_time)",
];

#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect_with(options)
            .await?;
        info!(url = %config.database_url, "sqlite pool ready");
        Ok(Self { pool })
    }

    /// A single-connection in-memory database; the pool never recycles the
    /// connection, so the data lives as long as the repository.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn to_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[async_trait]
impl TransactionRepository for SqliteRepository {
    async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn insert_transaction(
        &self,
        core: &TransactionCore,
        processed_at: DateTime<Utc>,
    ) -> Result<Transaction> {
        let sql = format!(
            "INSERT INTO transactions (merchant, category, amt, gender, city, province, \
             latitude, longitude, city_pop, job, unix_time, merch_latitude, merch_longitude, \
             processed_at, is_fraud, notification_sent) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0) RETURNING {}",
            TRANSACTION_COLUMNS
        );
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(&core.merchant)
            .bind(&core.category)
            .bind(core.amt)
            .bind(&core.gender)
            .bind(&core.city)
            .bind(&core.province)
            .bind(core.latitude)
            .bind(core.longitude)
            .bind(core.city_pop)
            .bind(&core.job)
            .bind(core.unix_time)
            .bind(core.merch_latitude)
            .bind(core.merch_longitude)
            .bind(processed_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_fraud_flag(
        &self,
        transaction_id: i64,
        is_fraud: bool,
        scored_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE transactions SET is_fraud = ?, scored_at = ? WHERE transaction_id = ?",
        )
        .bind(is_fraud)
        .bind(scored_at)
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("transaction {} not found", transaction_id);
        }
        Ok(())
    }

    async fn get_transaction(&self, transaction_id: i64) -> Result<Option<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE transaction_id = ?",
            TRANSACTION_COLUMNS
        );
        let row = sqlx::query_as::<_, Transaction>(&sql)
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions ORDER BY processed_at DESC, transaction_id DESC LIMIT ?",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Transaction>(&sql)
            .bind(to_limit(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_transactions(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(to_count(count))
    }

    async fn fetch_unnotified_fraud(&self, limit: usize) -> Result<Vec<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE is_fraud = 1 AND notification_sent = 0 \
             ORDER BY transaction_id ASC LIMIT ?",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Transaction>(&sql)
            .bind(to_limit(limit))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn mark_notified(&self, transaction_ids: &[i64]) -> Result<u64> {
        if transaction_ids.is_empty() {
            return Ok(0);
        }
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "UPDATE transactions SET notification_sent = 1 WHERE notification_sent = 0 AND transaction_id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in transaction_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_dashboard_counts(&self) -> Result<DashboardCounts> {
        let (total, fraud): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(CASE WHEN is_fraud = 1 THEN 1 ELSE 0 END), 0) \
             FROM transactions",
        )
        .fetch_one(&self.pool)
        .await?;
        let by_category: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM transactions GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(DashboardCounts {
            total: to_count(total),
            fraud: to_count(fraud),
            by_category: by_category
                .into_iter()
                .map(|(category, count)| (category, to_count(count)))
                .collect(),
        })
    }

    async fn fetch_fraud_points(&self) -> Result<Vec<FraudPoint>> {
        let rows = sqlx::query_as::<_, FraudPoint>(
            "SELECT latitude, longitude, province FROM transactions WHERE is_fraud = 1 \
             ORDER BY transaction_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn fetch_fraud_by_region(&self) -> Result<Vec<RegionCount>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT province, COUNT(*) AS count FROM transactions WHERE is_fraud = 1 \
             GROUP BY province ORDER BY count DESC, province ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(province, count)| RegionCount {
                province,
                count: to_count(count),
            })
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for SqliteRepository {
    async fn insert_detection(
        &self,
        user_id: i64,
        result: bool,
        date_time: DateTime<Utc>,
    ) -> Result<FraudDetection> {
        let row = sqlx::query_as::<_, FraudDetection>(
            "INSERT INTO fraud_detections (user_id, result, date_time) VALUES (?, ?, ?) \
             RETURNING fraud_detection_id, user_id, result, date_time",
        )
        .bind(user_id)
        .bind(result)
        .bind(date_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_detections(&self, limit: usize) -> Result<Vec<FraudDetection>> {
        let rows = sqlx::query_as::<_, FraudDetection>(
            "SELECT fraud_detection_id, user_id, result, date_time FROM fraud_detections \
             ORDER BY date_time DESC, fraud_detection_id DESC LIMIT ?",
        )
        .bind(to_limit(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
