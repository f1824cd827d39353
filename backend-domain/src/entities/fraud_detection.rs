// Fraud detection audit entity
// Append-only record of every scored prediction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FraudDetection {
    pub fraud_detection_id: i64,
    pub user_id: i64,
    pub result: bool,
    pub date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FraudDetectionQuery {
    pub limit: Option<usize>,
}
