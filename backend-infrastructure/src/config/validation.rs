use anyhow::{anyhow, Result};

pub fn validate_bind_addr(value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
    Ok(())
}

/// Alert targets are plain HTTP(S) webhooks or WebSocket endpoints.
pub fn validate_alert_url(value: &str) -> Result<()> {
    let trimmed = value.trim();
    let supported = ["http://", "https://", "ws://", "wss://"];
    if !supported.iter().any(|scheme| trimmed.starts_with(scheme)) {
        return Err(anyhow!(
            "alert_webhook_url must start with http://, https://, ws:// or wss://"
        ));
    }
    Ok(())
}

pub fn is_ws_url(value: &str) -> bool {
    value.starts_with("ws://") || value.starts_with("wss://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_url_schemes() {
        assert!(validate_alert_url("https://hooks.example.com/fraud").is_ok());
        assert!(validate_alert_url("ws://127.0.0.1:3001").is_ok());
        assert!(validate_alert_url("mailto:ops@example.com").is_err());
        assert!(is_ws_url("wss://bot.example.com"));
        assert!(!is_ws_url("http://bot.example.com"));
    }

    #[test]
    fn bind_addr_must_be_socket_addr() {
        assert!(validate_bind_addr("127.0.0.1:8000").is_ok());
        assert!(validate_bind_addr("localhost").is_err());
    }
}
