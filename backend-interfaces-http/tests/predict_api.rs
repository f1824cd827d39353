use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::FixedOffset;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower::ServiceExt;

use backend_application::{AppState, Metrics};
use backend_domain::{
    AlertDeliveryRecord, AuditRepository, FeatureDeriver, FeatureRow, FeatureValue, FraudScorer,
    ModelInfo, NotificationService, NotifierStatus, RuntimeConfig, ScoreOutcome, ScoringError,
    Transaction, TransactionRepository, FEATURE_COLUMNS,
};
use backend_infrastructure::SqliteRepository;
use backend_interfaces_http::build_router;

/// Flags anything above 1000 as fraud.
struct AmountScorer {
    fail: bool,
}

impl FraudScorer for AmountScorer {
    fn score(&self, row: &FeatureRow) -> Result<ScoreOutcome, ScoringError> {
        if self.fail {
            return Err(ScoringError::SchemaMismatch {
                expected: vec!["amt".to_string()],
                found: row.names(),
            });
        }
        let amt = match row.get("amt") {
            Some(FeatureValue::Number(value)) => *value,
            _ => 0.0,
        };
        let probability = if amt > 1000.0 { 0.9 } else { 0.1 };
        Ok(ScoreOutcome {
            probability,
            is_fraud: probability > 0.5,
        })
    }

    fn model_info(&self) -> ModelInfo {
        ModelInfo {
            model_id: "stub".to_string(),
            trained_at: "2024-03-01T00:00:00+00:00".to_string(),
            format_version: 1,
            checksum: String::new(),
            feature_columns: FEATURE_COLUMNS.iter().map(ToString::to_string).collect(),
            categorical_columns: Vec::new(),
            threshold: 0.5,
        }
    }
}

struct SilentNotifier;

#[async_trait]
impl NotificationService for SilentNotifier {
    fn spawn_fraud_alert(&self, _config: RuntimeConfig, _transaction: Transaction) {}

    async fn check_alert_target(&self, _config: &RuntimeConfig) -> anyhow::Result<()> {
        anyhow::bail!("alert webhook url not configured")
    }

    async fn list_alert_deliveries(&self, _limit: usize) -> Vec<AlertDeliveryRecord> {
        Vec::new()
    }

    async fn last_alert_delivery(&self) -> Option<AlertDeliveryRecord> {
        None
    }
}

fn runtime_config(api_token: Option<&str>) -> RuntimeConfig {
    RuntimeConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        api_token: api_token.map(ToString::to_string),
        model_path: "./models/fraud_pipeline.json".to_string(),
        naive_utc_offset: FixedOffset::east_opt(2 * 3600).expect("offset"),
        catalog_path: None,
        report_dir: "./reports".to_string(),
        alert_webhook_url: None,
        alert_webhook_template: None,
        alert_webhook_token: None,
        alert_recipients: Vec::new(),
        notification_interval_seconds: 60,
        notification_batch_size: 100,
        max_body_bytes: 1024 * 1024,
        request_timeout_seconds: 5,
    }
}

async fn app_with(api_token: Option<&str>, fail: bool) -> (Router, SqliteRepository) {
    let repo = SqliteRepository::in_memory().await.expect("sqlite");
    let config = runtime_config(api_token);
    let state = AppState {
        deriver: FeatureDeriver::new(config.naive_utc_offset),
        config,
        transaction_repo: Arc::new(repo.clone()),
        audit_repo: Arc::new(repo.clone()),
        notification_service: Arc::new(SilentNotifier),
        scorer: Arc::new(AmountScorer { fail }),
        metrics: Arc::new(Metrics::default()),
        notifier_status: Arc::new(RwLock::new(NotifierStatus::default())),
    };
    (build_router(state), repo)
}

async fn app() -> (Router, SqliteRepository) {
    app_with(None, false).await
}

fn payload(amt: f64) -> Value {
    json!({
        "merchant": "Amazon",
        "category": "Electronics",
        "amt": amt,
        "gender": "F",
        "city": "Bulawayo",
        "province": "Bulawayo",
        "latitude": -20.15,
        "longitude": 28.58,
        "city_pop": 650000,
        "job": "Banker",
        "unix_time": 1709996400,
        "merch_latitude": -17.83,
        "merch_longitude": 31.05,
        "processed_at": "2024-03-09T15:00:00"
    })
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn predict_scores_and_persists() {
    let (app, repo) = app().await;
    let mut request = post_json("/api/predict/", &payload(2500.0));
    request
        .headers_mut()
        .insert("X-User-Id", "7".parse().expect("header"));
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"prediction": 1}));

    let stored = repo.get_transaction(1).await.expect("get").expect("row");
    assert!(stored.is_fraud);
    assert!(stored.is_scored());
    assert_eq!(stored.processed_at.to_rfc3339(), "2024-03-09T13:00:00+00:00");

    let audit = repo.list_detections(10).await.expect("audit");
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].user_id, 7);
    assert!(audit[0].result);
}

#[tokio::test]
async fn predict_without_trailing_slash_returns_zero_for_small_amounts() {
    let (app, _repo) = app().await;
    let (status, body) = send(&app, post_json("/api/predict", &payload(12.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], 0);
}

#[tokio::test]
async fn non_positive_amount_is_rejected_without_writing() {
    let (app, repo) = app().await;
    let (status, body) = send(&app, post_json("/api/predict/", &payload(0.0))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["amt"][0], "Transaction amount must be positive");
    assert_eq!(repo.count_transactions().await.expect("count"), 0);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let (app, repo) = app().await;
    let mut body = payload(50.0);
    body["latitude"] = json!(95.0);
    body["longitude"] = json!(-181.0);
    let (status, errors) = send(&app, post_json("/api/predict/", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(errors.get("latitude").is_some());
    assert!(errors.get("longitude").is_some());
    assert_eq!(repo.count_transactions().await.expect("count"), 0);
}

#[tokio::test]
async fn malformed_json_gets_error_body() {
    let (app, _repo) = app().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict/")
        .body(Body::from("{\"amt\": "))
        .expect("request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .starts_with("bad request:"));
}

#[tokio::test]
async fn gzip_encoded_body_is_accepted() {
    let (app, repo) = app().await;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload(80.0).to_string().as_bytes())
        .expect("gzip");
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict/")
        .header("Content-Encoding", "gzip")
        .body(Body::from(encoder.finish().expect("gzip")))
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(repo.count_transactions().await.expect("count"), 1);
}

#[tokio::test]
async fn gzip_body_inflating_past_limit_is_rejected() {
    let (app, repo) = app().await;
    let mut inflated = " ".repeat(2 * 1024 * 1024);
    inflated.push_str(&payload(80.0).to_string());
    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(inflated.as_bytes()).expect("gzip");
    let request = Request::builder()
        .method("POST")
        .uri("/api/predict/")
        .header("Content-Encoding", "gzip")
        .body(Body::from(encoder.finish().expect("gzip")))
        .expect("request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error").contains("exceeds"));
    assert_eq!(repo.count_transactions().await.expect("count"), 0);
}

#[tokio::test]
async fn scoring_failure_leaves_row_unscored() {
    let (app, repo) = app_with(None, true).await;
    let (status, body) = send(&app, post_json("/api/predict/", &payload(2500.0))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().expect("error").contains("scoring failed"));

    let stored = repo.get_transaction(1).await.expect("get").expect("row");
    assert!(!stored.is_scored());
    assert!(!stored.is_fraud);
    assert!(repo.list_detections(10).await.expect("audit").is_empty());
}

#[tokio::test]
async fn dashboard_requires_token_and_aggregates() {
    let (app, _repo) = app_with(Some("secret"), false).await;
    for amt in [10.0, 20.0, 30.0, 2000.0, 3000.0] {
        let (status, _) = send(&app, post_json("/api/predict/", &payload(amt))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, get("/api/dashboard", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, get("/api/dashboard", Some("secret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_transactions"], 5);
    assert_eq!(body["fraud_count"], 2);
    assert_eq!(body["fraud_percentage"], 40.0);
    assert_eq!(body["transaction_by_category"]["Electronics"], 5);

    let (status, map) = send(&app, get("/api/fraud-map", Some("secret"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(map["transactions"].as_array().map(Vec::len), Some(5));
    assert_eq!(map["fraud_transactions"].as_array().map(Vec::len), Some(2));
    assert_eq!(map["fraud_by_region"][0]["province"], "Bulawayo");
    assert_eq!(map["fraud_by_region"][0]["count"], 2);
}

#[tokio::test]
async fn transaction_lookup_and_listing() {
    let (app, _repo) = app().await;
    send(&app, post_json("/api/predict/", &payload(15.0))).await;

    let (status, body) = send(&app, get("/api/transactions/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transaction_id"], 1);
    assert_eq!(body["merchant"], "Amazon");

    let (status, body) = send(&app, get("/api/transactions/99", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not found");

    let (status, body) = send(&app, get("/api/transactions?limit=10", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, get("/api/fraud-detections", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["user_id"], 0);
}

#[tokio::test]
async fn ops_endpoints() {
    let (app, _repo) = app().await;
    let (status, _) = send(&app, get("/api/ops/health/live", None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get("/api/ops/health/ready", None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/api/ops/model", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_id"], "stub");
    assert_eq!(body["feature_columns"].as_array().map(Vec::len), Some(17));

    let (status, body) = send(&app, get("/api/ops/notifier", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], false);

    let (status, body) = send(&app, get("/api/ops/alert-target/check", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["mode"], "unset");

    send(&app, post_json("/api/predict/", &payload(15.0))).await;
    let response = app
        .clone()
        .oneshot(get("/api/ops/metrics/prometheus", None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let text = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(text.contains("fraudlens_predict_requests_total 1"));
}
