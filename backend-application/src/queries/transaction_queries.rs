use tracing::error;

use backend_domain::{Transaction, TransactionListQuery};

use crate::AppError;
use crate::AppState;

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 500;

pub async fn list_transactions(
    state: &AppState,
    query: TransactionListQuery,
) -> Result<Vec<Transaction>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
    state.transaction_repo.list_recent(limit).await.map_err(|err| {
        error!("failed to list transactions: {}", err);
        AppError::Internal(err)
    })
}

pub async fn get_transaction(state: &AppState, transaction_id: i64) -> Result<Transaction, AppError> {
    state
        .transaction_repo
        .get_transaction(transaction_id)
        .await
        .map_err(|err| {
            error!("failed to fetch transaction {}: {}", transaction_id, err);
            AppError::Internal(err)
        })?
        .ok_or(AppError::NotFound)
}
