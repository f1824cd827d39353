use serde::{Deserialize, Serialize};

use backend_domain::{FeatureRow, FeatureValue, ScoringError};

use crate::encoder::OneHotEncoder;
use crate::scaler::StandardScaler;
use crate::schema::FeatureSchema;

/// One-hot block for categorical columns followed by the standardized
/// numeric block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub encoder: OneHotEncoder,
    pub scaler: StandardScaler,
    pub categorical_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
}

impl ColumnTransformer {
    pub fn fit(schema: &FeatureSchema, rows: &[FeatureRow]) -> Result<Self, ScoringError> {
        let categorical_columns = schema.categorical_columns();
        let numeric_columns = schema.numeric_columns();

        let mut categorical = Vec::with_capacity(rows.len());
        let mut numeric = Vec::with_capacity(rows.len());
        for row in rows {
            schema.check(row)?;
            categorical.push(split_categorical(row, &categorical_columns)?);
            numeric.push(split_numeric(row, &numeric_columns)?);
        }

        Ok(Self {
            encoder: OneHotEncoder::fit(categorical_columns.clone(), &categorical),
            scaler: StandardScaler::fit(&numeric, numeric_columns.len()),
            categorical_columns,
            numeric_columns,
        })
    }

    pub fn output_dim(&self) -> usize {
        self.encoder.output_dim() + self.numeric_columns.len()
    }

    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, ScoringError> {
        let categorical = split_categorical(row, &self.categorical_columns)?;
        let numeric = split_numeric(row, &self.numeric_columns)?;
        let mut out = Vec::with_capacity(self.output_dim());
        self.encoder.transform_into(&categorical, &mut out);
        self.scaler.transform_into(&numeric, &mut out);
        Ok(out)
    }

    pub fn transform_all(&self, rows: &[FeatureRow]) -> Result<Vec<Vec<f64>>, ScoringError> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.encoder.feature_names();
        names.extend(self.numeric_columns.iter().cloned());
        names
    }
}

fn missing(column: &str) -> ScoringError {
    ScoringError::InvalidFeature {
        column: column.to_string(),
        reason: "missing".to_string(),
    }
}

fn split_categorical<'a>(
    row: &'a FeatureRow,
    columns: &[String],
) -> Result<Vec<&'a str>, ScoringError> {
    columns
        .iter()
        .map(|column| match row.get(column) {
            Some(FeatureValue::Category(value)) => Ok(value.as_str()),
            Some(other) => Err(ScoringError::InvalidFeature {
                column: column.clone(),
                reason: format!("expected category, found {}", other.kind()),
            }),
            None => Err(missing(column)),
        })
        .collect()
}

fn split_numeric(row: &FeatureRow, columns: &[String]) -> Result<Vec<f64>, ScoringError> {
    columns
        .iter()
        .map(|column| match row.get(column) {
            Some(FeatureValue::Number(value)) => Ok(*value),
            Some(other) => Err(ScoringError::InvalidFeature {
                column: column.clone(),
                reason: format!("expected number, found {}", other.kind()),
            }),
            None => Err(missing(column)),
        })
        .collect()
}
