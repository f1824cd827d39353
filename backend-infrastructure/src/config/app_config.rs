use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{parse_utc_offset, DbConfig, RuntimeConfig};

use crate::config::validation::{validate_alert_url, validate_bind_addr};
use crate::utils::resolve_path;

pub const CONFIG_ENV: &str = "FRAUDLENS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub database_url: String,
    pub database_max_connections: u32,
    pub model_path: String,
    pub naive_utc_offset: String,
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".to_string(),
            api_token: None,
            database_url: "sqlite://fraudlens.db".to_string(),
            database_max_connections: 5,
            model_path: "./models/fraud_pipeline.json".to_string(),
            naive_utc_offset: "+02:00".to_string(),
            catalog_path: None,
            report_dir: "./reports".to_string(),
            alert_webhook_url: None,
            alert_webhook_template: None,
            alert_webhook_token: None,
            alert_recipients: Vec::new(),
            notification_interval_seconds: 60,
            notification_batch_size: 100,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path)).await
    }

    pub async fn load_from(file_path: &Path) -> Result<Self> {
        let base_dir = file_path.parent();
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!(path = %file_path.display(), "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.resolve_paths(base_dir);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        self.api_token = non_blank(self.api_token.take());
        self.catalog_path = non_blank(self.catalog_path.take());
        self.alert_webhook_url = non_blank(self.alert_webhook_url.take());
        self.alert_webhook_template = non_blank(self.alert_webhook_template.take());
        self.alert_webhook_token = non_blank(self.alert_webhook_token.take());
        self.alert_recipients = normalize_list(std::mem::take(&mut self.alert_recipients));
        self.naive_utc_offset = self.naive_utc_offset.trim().to_string();
        if self.database_max_connections == 0 {
            self.database_max_connections = 1;
        }
    }

    fn resolve_paths(&mut self, base_dir: Option<&Path>) {
        let Some(base) = base_dir else {
            return;
        };
        self.model_path = resolve_path(base, &self.model_path);
        self.report_dir = resolve_path(base, &self.report_dir);
        if let Some(path) = &self.catalog_path {
            self.catalog_path = Some(resolve_path(base, path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_bind_addr(&self.bind_addr)?;
        parse_utc_offset(&self.naive_utc_offset)
            .map_err(|err| anyhow!("invalid naive_utc_offset: {}", err))?;
        if self.database_url.trim().is_empty() {
            return Err(anyhow!("database_url must not be empty"));
        }
        if self.model_path.trim().is_empty() {
            return Err(anyhow!("model_path must not be empty"));
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }
        if self.notification_interval_seconds == 0 {
            return Err(anyhow!("notification_interval_seconds must be greater than 0"));
        }
        if self.notification_batch_size == 0 {
            return Err(anyhow!("notification_batch_size must be greater than 0"));
        }
        if let Some(url) = &self.alert_webhook_url {
            validate_alert_url(url)?;
        }
        Ok(())
    }

    pub fn to_runtime_config(&self) -> Result<RuntimeConfig> {
        Ok(RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            model_path: self.model_path.clone(),
            naive_utc_offset: parse_utc_offset(&self.naive_utc_offset)?,
            catalog_path: self.catalog_path.clone(),
            report_dir: self.report_dir.clone(),
            alert_webhook_url: self.alert_webhook_url.clone(),
            alert_webhook_template: self.alert_webhook_template.clone(),
            alert_webhook_token: self.alert_webhook_token.clone(),
            alert_recipients: self.alert_recipients.clone(),
            notification_interval_seconds: self.notification_interval_seconds,
            notification_batch_size: self.notification_batch_size,
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
        })
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            database_url: self.database_url.clone(),
            max_connections: self.database_max_connections,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("FRAUDLENS_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("FRAUDLENS_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("FRAUDLENS_DATABASE_URL") {
            self.database_url = value;
        }
        if let Ok(value) = env::var("FRAUDLENS_DATABASE_MAX_CONNECTIONS") {
            self.database_max_connections =
                value.parse().unwrap_or(self.database_max_connections);
        }
        if let Ok(value) = env::var("FRAUDLENS_MODEL_PATH") {
            self.model_path = value;
        }
        if let Ok(value) = env::var("FRAUDLENS_NAIVE_UTC_OFFSET") {
            self.naive_utc_offset = value;
        }
        if let Ok(value) = env::var("FRAUDLENS_CATALOG_PATH") {
            self.catalog_path = Some(value);
        }
        if let Ok(value) = env::var("FRAUDLENS_REPORT_DIR") {
            self.report_dir = value;
        }
        if let Ok(value) = env::var("FRAUDLENS_ALERT_WEBHOOK_URL") {
            self.alert_webhook_url = Some(value);
        }
        if let Ok(value) = env::var("FRAUDLENS_ALERT_WEBHOOK_TEMPLATE") {
            self.alert_webhook_template = Some(value);
        }
        if let Ok(value) = env::var("FRAUDLENS_ALERT_WEBHOOK_TOKEN") {
            self.alert_webhook_token = Some(value);
        }
        if let Ok(value) = env::var("FRAUDLENS_ALERT_RECIPIENTS") {
            self.alert_recipients = parse_env_list(&value);
        }
        if let Ok(value) = env::var("FRAUDLENS_NOTIFICATION_INTERVAL_SECONDS") {
            self.notification_interval_seconds =
                value.parse().unwrap_or(self.notification_interval_seconds);
        }
        if let Ok(value) = env::var("FRAUDLENS_NOTIFICATION_BATCH_SIZE") {
            self.notification_batch_size = value.parse().unwrap_or(self.notification_batch_size);
        }
        if let Ok(value) = env::var("FRAUDLENS_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("FRAUDLENS_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        let runtime = config.to_runtime_config().expect("runtime config");
        assert_eq!(runtime.naive_utc_offset.local_minus_utc(), 7200);
        assert_eq!(runtime.notification_interval_seconds, 60);
        assert_eq!(runtime.model_path, "./models/fraud_pipeline.json");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            alert_recipients = [" ops@example.com ", "", "ops@example.com"]
            api_token = "   "
            "#,
        )
        .expect("parse");
        let mut config = config;
        config.normalize();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.notification_batch_size, 100);
        assert_eq!(config.alert_recipients, vec!["ops@example.com".to_string()]);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = AppConfig {
            naive_utc_offset: "Harare".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
        config.naive_utc_offset = "+02:00".to_string();
        config.notification_interval_seconds = 0;
        assert!(config.validate().is_err());
        config.notification_interval_seconds = 60;
        config.alert_webhook_url = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_request_timeout() {
        let config = AppConfig {
            request_timeout_seconds: 0,
            ..AppConfig::default()
        };
        let err = config.validate().expect_err("zero timeout");
        assert!(err.to_string().contains("request_timeout_seconds"));
    }

    #[test]
    fn relative_paths_follow_config_dir() {
        let mut config = AppConfig::default();
        config.catalog_path = Some("catalog.yaml".to_string());
        config.resolve_paths(Some(Path::new("/srv/fraudlens")));
        assert_eq!(config.model_path, "/srv/fraudlens/./models/fraud_pipeline.json");
        assert_eq!(config.catalog_path.as_deref(), Some("/srv/fraudlens/catalog.yaml"));
    }
}
