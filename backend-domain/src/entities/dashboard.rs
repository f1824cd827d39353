// Dashboard entities
// Aggregates read by the dashboard and the fraud map

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::entities::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardSummary {
    pub total_transactions: u64,
    pub fraud_count: u64,
    pub fraud_percentage: f64,
    pub transaction_by_category: BTreeMap<String, u64>,
}

/// Raw counts as returned by the repository, before percentages are derived.
#[derive(Debug, Clone, Default)]
pub struct DashboardCounts {
    pub total: u64,
    pub fraud: u64,
    pub by_category: Vec<(String, u64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct FraudPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub province: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionCount {
    pub province: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FraudMap {
    pub transactions: Vec<Transaction>,
    pub fraud_transactions: Vec<FraudPoint>,
    pub fraud_by_region: Vec<RegionCount>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FraudMapQuery {
    pub limit: Option<usize>,
}
