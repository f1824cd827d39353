use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::SinkExt;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{info, warn};

use backend_domain::ports::NotificationService;
use backend_domain::{AlertDeliveryRecord, RuntimeConfig, Transaction};

use crate::config::validation::is_ws_url;

pub const ALERT_SUBJECT: &str = "Fraud Alert: Suspicious Transaction Detected";
pub const DEFAULT_ALERT_TEMPLATE: &str =
    r#"{"subject":"{subject}","message":"{message}","recipients":{recipients}}"#;
const DELIVERY_LOG_CAPACITY: usize = 200;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Sends fraud alerts to the configured webhook and keeps a bounded log of
/// recent delivery attempts.
#[derive(Clone, Default)]
pub struct DefaultNotificationService {
    deliveries: Arc<Mutex<VecDeque<AlertDeliveryRecord>>>,
}

impl DefaultNotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send_fraud_alert(
        &self,
        config: &RuntimeConfig,
        transaction: &Transaction,
    ) -> AlertDeliveryRecord {
        let (target, mode, result) = match resolve_alert_url(config) {
            Ok(url) => {
                let mode = if is_ws_url(&url) { "ws" } else { "http" };
                let result = if mode == "ws" {
                    send_ws_alert(config, &url, transaction).await
                } else {
                    send_http_alert(config, &url, transaction).await
                };
                (url, mode, result)
            }
            Err(err) => (String::new(), "none", Err(err)),
        };

        let record = AlertDeliveryRecord {
            transaction_id: transaction.transaction_id,
            target,
            mode: mode.to_string(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|err| err.to_string()),
            delivered_at: chrono::Utc::now().timestamp(),
        };
        match &result {
            Ok(()) => info!(
                transaction_id = transaction.transaction_id,
                mode,
                "fraud alert delivered"
            ),
            Err(err) => warn!(
                transaction_id = transaction.transaction_id,
                mode,
                "fraud alert failed: {}",
                err
            ),
        }
        self.push_delivery(record.clone()).await;
        record
    }

    async fn push_delivery(&self, record: AlertDeliveryRecord) {
        let mut deliveries = self.deliveries.lock().await;
        if deliveries.len() >= DELIVERY_LOG_CAPACITY {
            deliveries.pop_front();
        }
        deliveries.push_back(record);
    }
}

#[async_trait]
impl NotificationService for DefaultNotificationService {
    fn spawn_fraud_alert(&self, config: RuntimeConfig, transaction: Transaction) {
        let service = self.clone();
        tokio::spawn(async move {
            service.send_fraud_alert(&config, &transaction).await;
        });
    }

    async fn check_alert_target(&self, config: &RuntimeConfig) -> Result<()> {
        check_alert_target(config).await
    }

    async fn list_alert_deliveries(&self, limit: usize) -> Vec<AlertDeliveryRecord> {
        let deliveries = self.deliveries.lock().await;
        deliveries.iter().rev().take(limit).cloned().collect()
    }

    async fn last_alert_delivery(&self) -> Option<AlertDeliveryRecord> {
        self.deliveries.lock().await.back().cloned()
    }
}

pub async fn check_alert_target(config: &RuntimeConfig) -> Result<()> {
    let url = resolve_alert_url(config)?;
    if is_ws_url(&url) {
        let mut ws = connect_ws(config, &url).await?;
        let _ = ws.close(None).await;
        Ok(())
    } else {
        check_http_target(config, &url).await
    }
}

fn http_client(config: &RuntimeConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_seconds.max(3)))
        .build()?)
}

fn alert_payload(config: &RuntimeConfig, transaction: &Transaction) -> String {
    let template = config
        .alert_webhook_template
        .as_deref()
        .unwrap_or(DEFAULT_ALERT_TEMPLATE);
    build_payload(transaction, &config.alert_recipients, template)
}

async fn send_http_alert(config: &RuntimeConfig, url: &str, transaction: &Transaction) -> Result<()> {
    let mut request = http_client(config)?
        .post(url)
        .header("Content-Type", "application/json")
        .body(alert_payload(config, transaction));
    if let Some(token) = &config.alert_webhook_token {
        request = request.bearer_auth(token);
    }
    request.send().await?.error_for_status()?;
    Ok(())
}

async fn check_http_target(config: &RuntimeConfig, url: &str) -> Result<()> {
    let response = http_client(config)?.get(url).send().await?;
    if !response.status().is_success() {
        anyhow::bail!("alert webhook responded {}", response.status());
    }
    Ok(())
}

/// Pushes the same payload the HTTP webhook receives as one text frame.
async fn send_ws_alert(config: &RuntimeConfig, url: &str, transaction: &Transaction) -> Result<()> {
    let mut ws = connect_ws(config, url).await?;
    ws.send(Message::Text(alert_payload(config, transaction)))
        .await?;
    let _ = ws.close(None).await;
    Ok(())
}

async fn connect_ws(config: &RuntimeConfig, url: &str) -> Result<WsStream> {
    let mut request = url.into_client_request()?;
    if let Some(token) = &config.alert_webhook_token {
        request
            .headers_mut()
            .insert(AUTHORIZATION, format!("Bearer {}", token).parse()?);
    }
    let connect = tokio_tungstenite::connect_async(request);
    let (ws, _) = timeout(Duration::from_secs(config.request_timeout_seconds.max(3)), connect)
        .await
        .map_err(|_| anyhow::anyhow!("alert websocket connect timed out"))??;
    Ok(ws)
}

fn resolve_alert_url(config: &RuntimeConfig) -> Result<String> {
    match &config.alert_webhook_url {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => anyhow::bail!("alert webhook url not configured"),
    }
}

pub fn build_message(transaction: &Transaction) -> String {
    let core = &transaction.core;
    [
        ALERT_SUBJECT.to_string(),
        format!(
            "Transaction #{}: {:.2} at {} ({})",
            transaction.transaction_id, core.amt, core.merchant, core.category
        ),
        format!(
            "Location: {}, {} | customer {} | job {}",
            core.city, core.province, core.gender, core.job
        ),
        format!("Processed at: {}", transaction.processed_at.to_rfc3339()),
    ]
    .join("\n")
}

/// Fills the webhook template. Text placeholders are JSON-escaped so the
/// default template stays valid JSON; `{recipients}` expands to an array.
pub fn build_payload(transaction: &Transaction, recipients: &[String], template: &str) -> String {
    let core = &transaction.core;
    let recipients = serde_json::to_string(recipients).unwrap_or_else(|_| "[]".to_string());
    template
        .replace("{subject}", &json_escape(ALERT_SUBJECT))
        .replace("{message}", &json_escape(&build_message(transaction)))
        .replace("{transaction_id}", &transaction.transaction_id.to_string())
        .replace("{amt}", &format!("{:.2}", core.amt))
        .replace("{merchant}", &json_escape(&core.merchant))
        .replace("{category}", &json_escape(&core.category))
        .replace("{city}", &json_escape(&core.city))
        .replace("{province}", &json_escape(&core.province))
        .replace("{processed_at}", &transaction.processed_at.to_rfc3339())
        .replace("{recipients}", &recipients)
}

fn json_escape(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}
