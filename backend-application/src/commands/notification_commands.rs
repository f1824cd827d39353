use backend_domain::current_millis;
use tracing::{error, info};

use crate::AppError;
use crate::AppState;

/// One pass of the fraud notification job.
///
/// Each unnotified fraud row gets an alert spawned and is flagged right
/// away; delivery results land in the alert delivery log, not here.
pub async fn run_notification_sweep(state: &AppState) -> Result<usize, AppError> {
    let batch_size = state.config.notification_batch_size.max(1);
    let pending = match state.transaction_repo.fetch_unnotified_fraud(batch_size).await {
        Ok(rows) => rows,
        Err(err) => {
            record_sweep_failure(state, &err.to_string()).await;
            error!("failed to fetch pending fraud notifications: {}", err);
            return Err(AppError::Internal(err));
        }
    };

    let ids: Vec<i64> = pending.iter().map(|row| row.transaction_id).collect();
    for transaction in pending {
        state
            .notification_service
            .spawn_fraud_alert(state.config.clone(), transaction);
    }

    if !ids.is_empty() {
        if let Err(err) = state.transaction_repo.mark_notified(&ids).await {
            record_sweep_failure(state, &err.to_string()).await;
            error!("failed to mark transactions notified: {}", err);
            return Err(AppError::Internal(err));
        }
        info!(count = ids.len(), "fraud notifications dispatched");
    }

    state.metrics.record_sweep(ids.len());
    let mut status = state.notifier_status.write().await;
    status.sweeps += 1;
    status.dispatched += ids.len() as u64;
    status.last_sweep_at = Some(current_millis());
    status.last_error = None;
    Ok(ids.len())
}

async fn record_sweep_failure(state: &AppState, message: &str) {
    state.metrics.record_notification_error();
    let mut status = state.notifier_status.write().await;
    status.sweeps += 1;
    status.last_sweep_at = Some(current_millis());
    status.last_error = Some(message.to_string());
}
