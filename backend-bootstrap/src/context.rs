use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;
use tracing::info;

use backend_application::{AppState, Metrics};
use backend_domain::{FeatureDeriver, NotifierStatus, TransactionRepository};
use backend_infrastructure::{AppConfig, DefaultNotificationService, SqliteRepository};
use backend_model::PipelineScorer;

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    /// Loads config, opens the database and loads the model artifact.
    /// Any failure here stops the process before it binds.
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config()?;
        let db_config = config.to_db_config();

        let repo = Arc::new(SqliteRepository::connect(&db_config).await?);
        repo.ensure_schema().await?;

        let scorer = PipelineScorer::load(Path::new(&runtime_config.model_path))
            .with_context(|| format!("failed to load model artifact {}", runtime_config.model_path))?;
        let model = scorer.artifact().info();
        info!(
            model_id = %model.model_id,
            trained_at = %model.trained_at,
            features = model.feature_columns.len(),
            "fraud pipeline ready"
        );

        let state = AppState {
            deriver: FeatureDeriver::new(runtime_config.naive_utc_offset),
            config: runtime_config,
            transaction_repo: repo.clone(),
            audit_repo: repo,
            notification_service: Arc::new(DefaultNotificationService::new()),
            scorer: Arc::new(scorer),
            metrics: Arc::new(Metrics::default()),
            notifier_status: Arc::new(RwLock::new(NotifierStatus::default())),
        };

        Ok(Self { state })
    }
}
