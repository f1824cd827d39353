use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use backend_domain::services::validate_transaction;

use crate::AppError;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: u8,
}

/// Validate, persist unscored, score, then persist the flag and the audit
/// row. A scoring failure leaves the stored row with `scored_at` unset.
pub async fn predict_transaction(
    state: &AppState,
    payload: &Value,
    user_id: i64,
) -> Result<PredictionResponse, AppError> {
    let new_transaction = validate_transaction(payload).map_err(|errors| {
        state.metrics.record_rejected();
        warn!(fields = ?errors.fields(), "prediction payload rejected");
        AppError::Validation(errors)
    })?;

    let processed_at = new_transaction
        .processed_at
        .as_ref()
        .map(|value| state.deriver.normalize(value))
        .unwrap_or_else(Utc::now);

    let transaction = state
        .transaction_repo
        .insert_transaction(&new_transaction.core, processed_at)
        .await
        .map_err(|err| {
            error!("failed to insert transaction: {}", err);
            AppError::Internal(err)
        })?;

    let row = state.deriver.feature_row_for(&transaction);
    let outcome = match state.scorer.score(&row) {
        Ok(outcome) => outcome,
        Err(err) => {
            state.metrics.record_scoring_error();
            error!(
                transaction_id = transaction.transaction_id,
                "scoring failed, transaction left unscored: {}", err
            );
            return Err(AppError::Scoring(err));
        }
    };

    let scored_at = Utc::now();
    state
        .transaction_repo
        .update_fraud_flag(transaction.transaction_id, outcome.is_fraud, scored_at)
        .await
        .map_err(|err| {
            error!(
                transaction_id = transaction.transaction_id,
                "failed to store fraud flag: {}", err
            );
            AppError::Internal(err)
        })?;

    // The flag is already committed, so a lost audit row does not fail the request.
    if let Err(err) = state
        .audit_repo
        .insert_detection(user_id, outcome.is_fraud, scored_at)
        .await
    {
        error!(
            transaction_id = transaction.transaction_id,
            "failed to append fraud detection record: {}", err
        );
    }

    state.metrics.record_prediction(outcome.is_fraud);
    info!(
        transaction_id = transaction.transaction_id,
        probability = outcome.probability,
        is_fraud = outcome.is_fraud,
        "transaction scored"
    );
    Ok(PredictionResponse {
        prediction: outcome.prediction(),
    })
}
