use std::time::Duration;

use tracing::{error, info, warn};

use backend_application::commands::notification_commands::run_notification_sweep;
use backend_application::AppState;
use backend_domain::RuntimeConfig;

pub fn notifier_enabled(config: &RuntimeConfig) -> bool {
    config
        .alert_webhook_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty())
}

/// Runs the fraud notification sweep every `notification_interval_seconds`.
/// Sweeps run back to back on this task, so two never overlap.
pub async fn schedule_notifications(state: AppState) {
    let interval_seconds = state.config.notification_interval_seconds.max(1);
    {
        let mut status = state.notifier_status.write().await;
        status.enabled = true;
        status.running = true;
        status.interval_seconds = interval_seconds;
    }
    info!(interval_seconds, "fraud notification job started");

    let interval = Duration::from_secs(interval_seconds);
    loop {
        tokio::time::sleep(interval).await;
        match run_notification_sweep(&state).await {
            Ok(0) => {}
            Ok(count) => info!(count, "notification sweep finished"),
            Err(err) => error!("notification sweep failed: {}", err),
        }
    }
}

/// Records why the job is not running and returns without spawning it.
pub async fn mark_notifier_disabled(state: &AppState) {
    let mut status = state.notifier_status.write().await;
    status.enabled = false;
    status.running = false;
    status.interval_seconds = state.config.notification_interval_seconds;
    warn!("alert_webhook_url not configured, fraud notification job disabled");
}
