// Transaction entity
// A card transaction as received by the prediction endpoint and stored afterwards

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::value_objects::ProcessedAt;

pub const MAX_TEXT_LEN: usize = 100;
pub const MAX_GENDER_LEN: usize = 10;

/// Raw fields shared by inbound payloads, stored rows and dataset records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TransactionCore {
    pub merchant: String,
    pub category: String,
    pub amt: f64,
    pub gender: String,
    pub city: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city_pop: i64,
    pub job: String,
    pub unix_time: i64,
    pub merch_latitude: f64,
    pub merch_longitude: f64,
}

/// A validated transaction that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub core: TransactionCore,
    pub processed_at: Option<ProcessedAt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub transaction_id: i64,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub core: TransactionCore,
    pub processed_at: DateTime<Utc>,
    pub is_fraud: bool,
    pub notification_sent: bool,
    pub scored_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub fn is_scored(&self) -> bool {
        self.scored_at.is_some()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TransactionListQuery {
    pub limit: Option<usize>,
}
