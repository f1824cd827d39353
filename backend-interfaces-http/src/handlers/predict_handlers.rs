use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::warn;

use backend_application::commands::predict_commands::{self, PredictionResponse};
use backend_application::AppState;

use crate::error::HttpError;
use crate::middleware::{parse_json_body, user_id_from_headers};

pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<PredictionResponse>, HttpError> {
    let limit = usize::try_from(state.config.max_body_bytes).unwrap_or(usize::MAX);
    let payload = parse_json_body(&headers, &body, limit).map_err(|err| {
        state.metrics.record_rejected();
        warn!("failed to parse prediction body: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let user_id = user_id_from_headers(&headers).map_err(|err| {
        state.metrics.record_rejected();
        HttpError::BadRequest(err.to_string())
    })?;

    let response = predict_commands::predict_transaction(&state, &payload, user_id).await?;
    Ok(Json(response))
}
