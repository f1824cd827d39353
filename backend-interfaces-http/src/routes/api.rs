use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{dashboard_handlers, ops_handlers, predict_handlers, transaction_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict/", post(predict_handlers::predict))
        .route("/api/predict", post(predict_handlers::predict))
        .route("/api/dashboard", get(dashboard_handlers::get_dashboard))
        .route("/api/fraud-map", get(dashboard_handlers::get_fraud_map))
        .route(
            "/api/transactions",
            get(transaction_handlers::list_transactions),
        )
        .route(
            "/api/transactions/:transaction_id",
            get(transaction_handlers::get_transaction),
        )
        .route(
            "/api/fraud-detections",
            get(transaction_handlers::list_fraud_detections),
        )
        .route("/api/ops/model", get(ops_handlers::get_model_info))
        .route("/api/ops/notifier", get(ops_handlers::get_notifier_status))
        .route(
            "/api/ops/alert-target/check",
            get(ops_handlers::alert_target_check),
        )
        .route(
            "/api/ops/alert-deliveries",
            get(ops_handlers::list_alert_deliveries),
        )
        .route(
            "/api/ops/alert-deliveries/last",
            get(ops_handlers::get_last_alert_delivery),
        )
        .route("/api/ops/health/live", get(ops_handlers::health_live))
        .route("/api/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/api/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
