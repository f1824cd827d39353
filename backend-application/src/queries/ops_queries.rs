use backend_domain::{ModelInfo, NotifierStatus};

use crate::AppState;

pub async fn get_notifier_status(state: &AppState) -> NotifierStatus {
    state.notifier_status.read().await.clone()
}

pub fn get_model_info(state: &AppState) -> ModelInfo {
    state.scorer.model_info()
}
