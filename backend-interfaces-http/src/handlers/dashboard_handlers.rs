use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::dashboard_queries;
use backend_application::AppState;
use backend_domain::{DashboardSummary, FraudMap, FraudMapQuery};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn get_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardSummary>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let summary = dashboard_queries::get_dashboard_summary(&state).await?;
    Ok(Json(summary))
}

pub async fn get_fraud_map(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FraudMapQuery>,
) -> Result<Json<FraudMap>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let map = dashboard_queries::get_fraud_map(&state, query).await?;
    Ok(Json(map))
}
