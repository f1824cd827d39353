// Model entities
// What the scoring port reports back to the application layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub probability: f64,
    pub is_fraud: bool,
}

impl ScoreOutcome {
    pub fn prediction(&self) -> u8 {
        u8::from(self.is_fraud)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_id: String,
    pub trained_at: String,
    pub format_version: u32,
    pub checksum: String,
    pub feature_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub threshold: f64,
}
