use thiserror::Error;

use backend_domain::{ScoringError, ValidationErrors};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("not found")]
    NotFound,
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
