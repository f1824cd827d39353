// Notification entities

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotifierStatus {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub running: bool,
    pub sweeps: u64,
    pub dispatched: u64,
    pub last_sweep_at: Option<i64>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDeliveryRecord {
    pub transaction_id: i64,
    pub target: String,
    pub mode: String,
    pub success: bool,
    pub error: Option<String>,
    pub delivered_at: i64,
}
