use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::queries::ops_queries;
use backend_application::AppState;
use backend_domain::{AlertDeliveryRecord, ModelInfo, NotifierStatus};

use crate::error::HttpError;
use crate::middleware::authorize;

#[derive(serde::Serialize)]
struct AlertStatus {
    status: String,
    mode: String,
}

#[derive(serde::Deserialize)]
pub struct AlertDeliveryQuery {
    pub limit: Option<usize>,
}

pub async fn get_model_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ModelInfo>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(ops_queries::get_model_info(&state)))
}

pub async fn get_notifier_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NotifierStatus>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    Ok(Json(ops_queries::get_notifier_status(&state).await))
}

pub async fn alert_target_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mode = match state.config.alert_webhook_url.as_deref() {
        Some(url) if url.starts_with("ws://") || url.starts_with("wss://") => "ws",
        Some(_) => "http",
        None => "unset",
    };
    let reply = |status: StatusCode, label: &str| {
        (
            status,
            Json(AlertStatus {
                status: label.to_string(),
                mode: mode.to_string(),
            }),
        )
            .into_response()
    };
    if !authorize(&state.config, &headers) {
        return reply(StatusCode::UNAUTHORIZED, "unauthorized");
    }

    let timeout_secs = state.config.request_timeout_seconds.max(1);
    match timeout(
        Duration::from_secs(timeout_secs),
        state.notification_service.check_alert_target(&state.config),
    )
    .await
    {
        Ok(Ok(_)) => reply(StatusCode::OK, "ok"),
        Ok(Err(err)) => {
            error!("alert target check failed: {}", err);
            reply(StatusCode::SERVICE_UNAVAILABLE, "error")
        }
        Err(_) => {
            error!("alert target check timeout after {}s", timeout_secs);
            reply(StatusCode::SERVICE_UNAVAILABLE, "timeout")
        }
    }
}

pub async fn list_alert_deliveries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AlertDeliveryQuery>,
) -> Result<Json<Vec<AlertDeliveryRecord>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let deliveries = state.notification_service.list_alert_deliveries(limit).await;
    Ok(Json(deliveries))
}

pub async fn get_last_alert_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<AlertDeliveryRecord>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let last = state.notification_service.last_alert_delivery().await;
    Ok(Json(last))
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.transaction_repo.ping()).await {
        Ok(Ok(_)) => StatusCode::OK,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
