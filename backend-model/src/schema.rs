use serde::{Deserialize, Serialize};

use backend_domain::{FeatureRow, FeatureValue, ScoringError, CATEGORICAL_COLUMNS, FEATURE_COLUMNS};

/// Column layout a pipeline was fit on. Stored inside the artifact and
/// checked against every row before inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub columns: Vec<String>,
    pub categorical: Vec<String>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            categorical: CATEGORICAL_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl FeatureSchema {
    pub fn is_categorical(&self, column: &str) -> bool {
        self.categorical.iter().any(|c| c == column)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| self.is_categorical(c))
            .cloned()
            .collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !self.is_categorical(c))
            .cloned()
            .collect()
    }

    pub fn check(&self, row: &FeatureRow) -> Result<(), ScoringError> {
        let found = row.names();
        if found != self.columns {
            return Err(ScoringError::SchemaMismatch {
                expected: self.columns.clone(),
                found,
            });
        }
        for (column, value) in row.entries() {
            match (self.is_categorical(column), value) {
                (true, FeatureValue::Category(_)) => {}
                (false, FeatureValue::Number(number)) if number.is_finite() => {}
                (false, FeatureValue::Number(_)) => {
                    return Err(ScoringError::InvalidFeature {
                        column: column.clone(),
                        reason: "value is not finite".to_string(),
                    })
                }
                (categorical, other) => {
                    return Err(ScoringError::InvalidFeature {
                        column: column.clone(),
                        reason: format!(
                            "expected {}, found {}",
                            if categorical { "category" } else { "number" },
                            other.kind()
                        ),
                    })
                }
            }
        }
        Ok(())
    }
}
