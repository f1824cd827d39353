use tracing::error;

use backend_domain::{DashboardSummary, FraudMap, FraudMapQuery};

use crate::AppError;
use crate::AppState;

pub const DEFAULT_MAP_LIMIT: usize = 1000;
pub const MAX_MAP_LIMIT: usize = 5000;

pub async fn get_dashboard_summary(state: &AppState) -> Result<DashboardSummary, AppError> {
    let counts = state
        .transaction_repo
        .fetch_dashboard_counts()
        .await
        .map_err(|err| {
            error!("failed to fetch dashboard counts: {}", err);
            AppError::Internal(err)
        })?;
    Ok(DashboardSummary::from_counts(counts))
}

pub async fn get_fraud_map(state: &AppState, query: FraudMapQuery) -> Result<FraudMap, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_MAP_LIMIT).clamp(1, MAX_MAP_LIMIT);
    let repo = &state.transaction_repo;
    let transactions = repo.list_recent(limit).await.map_err(internal)?;
    let fraud_transactions = repo.fetch_fraud_points().await.map_err(internal)?;
    let fraud_by_region = repo.fetch_fraud_by_region().await.map_err(internal)?;
    Ok(FraudMap {
        transactions,
        fraud_transactions,
        fraud_by_region,
    })
}

fn internal(err: anyhow::Error) -> AppError {
    error!("failed to build fraud map: {}", err);
    AppError::Internal(err)
}
