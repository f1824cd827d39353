use thiserror::Error;

use backend_domain::ScoringError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("training data needs both classes, found only {0}")]
    SingleClass(u8),
    #[error("SMOTE needs at least 2 minority samples, found {0}")]
    InsufficientMinority(usize),
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("unsupported artifact format version {0}")]
    UnsupportedFormat(u32),
    #[error("artifact checksum mismatch: recorded {recorded}, computed {computed}")]
    ChecksumMismatch { recorded: String, computed: String },
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
