// Runtime configuration shared by the application layer

use chrono::FixedOffset;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub model_path: String,
    pub naive_utc_offset: FixedOffset,
    pub catalog_path: Option<String>,
    pub report_dir: String,
    pub alert_webhook_url: Option<String>,
    pub alert_webhook_template: Option<String>,
    pub alert_webhook_token: Option<String>,
    pub alert_recipients: Vec<String>,
    pub notification_interval_seconds: u64,
    pub notification_batch_size: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}
