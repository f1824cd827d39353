use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::{audit_queries, transaction_queries};
use backend_application::AppState;
use backend_domain::{FraudDetection, FraudDetectionQuery, Transaction, TransactionListQuery};

use crate::error::HttpError;
use crate::middleware::authorize;

pub async fn list_transactions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<Vec<Transaction>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rows = transaction_queries::list_transactions(&state, query).await?;
    Ok(Json(rows))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(transaction_id): Path<i64>,
) -> Result<Json<Transaction>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let row = transaction_queries::get_transaction(&state, transaction_id).await?;
    Ok(Json(row))
}

pub async fn list_fraud_detections(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FraudDetectionQuery>,
) -> Result<Json<Vec<FraudDetection>>, HttpError> {
    if !authorize(&state.config, &headers) {
        return Err(HttpError::Unauthorized);
    }
    let rows = audit_queries::list_fraud_detections(&state, query).await?;
    Ok(Json(rows))
}
