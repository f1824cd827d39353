use tracing::error;

use backend_domain::{FraudDetection, FraudDetectionQuery};

use crate::AppError;
use crate::AppState;

pub async fn list_fraud_detections(
    state: &AppState,
    query: FraudDetectionQuery,
) -> Result<Vec<FraudDetection>, AppError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    state.audit_repo.list_detections(limit).await.map_err(|err| {
        error!("failed to list fraud detections: {}", err);
        AppError::Internal(err)
    })
}
