use std::io::Read;

use anyhow::{anyhow, Result};
use axum::http::HeaderMap;
use flate2::read::GzDecoder;
use serde_json::Value;

use backend_domain::RuntimeConfig;

pub const USER_ID_HEADER: &str = "X-User-Id";

pub fn authorize(config: &RuntimeConfig, headers: &HeaderMap) -> bool {
    if let Some(api_token) = &config.api_token {
        return extract_bearer(headers)
            .map(|v| v == *api_token)
            .unwrap_or(false);
    }
    true
}

/// Decodes a (possibly gzip-encoded) body that must hold a JSON object.
/// `limit` caps the decoded size in bytes.
pub fn parse_json_body(headers: &HeaderMap, body: &[u8], limit: usize) -> Result<Value> {
    let content = maybe_gunzip(headers, body, limit)?;
    let value: Value = serde_json::from_str(&content)?;
    if !value.is_object() {
        return Err(anyhow!("expected a JSON object"));
    }
    Ok(value)
}

/// Audit user id from `X-User-Id`; absent means anonymous (0).
pub fn user_id_from_headers(headers: &HeaderMap) -> Result<i64> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(0);
    };
    let text = raw.to_str()?.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<i64>()
        .map_err(|_| anyhow!("invalid {} header '{}'", USER_ID_HEADER, text))
}

pub fn maybe_gunzip(headers: &HeaderMap, body: &[u8], limit: usize) -> Result<String> {
    if let Some(encoding) = headers.get("Content-Encoding") {
        if encoding.to_str().unwrap_or("") == "gzip" {
            let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
            let mut decoder = GzDecoder::new(body).take(cap);
            let mut out = Vec::new();
            decoder.read_to_end(&mut out)?;
            if out.len() > limit {
                return Err(anyhow!("decompressed body exceeds {} bytes", limit));
            }
            return Ok(String::from_utf8(out)?);
        }
    }
    if body.len() > limit {
        return Err(anyhow!("body exceeds {} bytes", limit));
    }
    Ok(String::from_utf8(body.to_vec())?)
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("Authorization")?.to_str().ok()?.trim();
    let prefix = "Bearer ";
    if !value.starts_with(prefix) {
        return None;
    }
    let token = value[prefix.len()..].trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use axum::http::HeaderValue;
    use chrono::FixedOffset;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn config(token: Option<&str>) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: token.map(ToString::to_string),
            model_path: "model.json".to_string(),
            naive_utc_offset: FixedOffset::east_opt(0).expect("offset"),
            catalog_path: None,
            report_dir: "reports".to_string(),
            alert_webhook_url: None,
            alert_webhook_template: None,
            alert_webhook_token: None,
            alert_recipients: Vec::new(),
            notification_interval_seconds: 60,
            notification_batch_size: 100,
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
        }
    }

    #[test]
    fn bearer_token_must_match() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&config(None), &headers));
        assert!(!authorize(&config(Some("secret")), &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer secret"));
        assert!(authorize(&config(Some("secret")), &headers));
        headers.insert("Authorization", HeaderValue::from_static("Bearer other"));
        assert!(!authorize(&config(Some("secret")), &headers));
    }

    #[test]
    fn gzip_bodies_are_inflated() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"amt": 10}"#).expect("write");
        let body = encoder.finish().expect("finish");
        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        let value = parse_json_body(&headers, &body, 1024).expect("json");
        assert_eq!(value["amt"], 10);
    }

    #[test]
    fn inflated_size_is_capped() {
        let mut inflated = " ".repeat(64 * 1024);
        inflated.push_str(r#"{"amt": 10}"#);
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(inflated.as_bytes()).expect("write");
        let body = encoder.finish().expect("finish");
        assert!(body.len() < 1024);

        let mut headers = HeaderMap::new();
        headers.insert("Content-Encoding", HeaderValue::from_static("gzip"));
        let err = parse_json_body(&headers, &body, 1024).expect_err("over limit");
        assert!(err.to_string().contains("exceeds 1024 bytes"));
        assert!(parse_json_body(&headers, &body, inflated.len()).is_ok());
    }

    #[test]
    fn rejects_malformed_and_non_object_bodies() {
        let headers = HeaderMap::new();
        assert!(parse_json_body(&headers, b"{not json", 1024).is_err());
        assert!(parse_json_body(&headers, b"[1, 2]", 1024).is_err());
    }

    #[test]
    fn user_id_header_defaults_to_zero() {
        let mut headers = HeaderMap::new();
        assert_eq!(user_id_from_headers(&headers).expect("default"), 0);
        headers.insert(USER_ID_HEADER, HeaderValue::from_static(" 17 "));
        assert_eq!(user_id_from_headers(&headers).expect("parsed"), 17);
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        assert!(user_id_from_headers(&headers).is_err());
    }
}
