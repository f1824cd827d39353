// Feature row value object
// Ordered, named model inputs for one transaction

use serde::{Deserialize, Serialize};

pub const CATEGORICAL_COLUMNS: [&str; 6] = ["merchant", "category", "gender", "city", "province", "job"];

pub const FEATURE_COLUMNS: [&str; 17] = [
    "merchant",
    "category",
    "amt",
    "gender",
    "city",
    "province",
    "latitude",
    "longitude",
    "city_pop",
    "job",
    "unix_time",
    "merch_latitude",
    "merch_longitude",
    "hour",
    "day_of_week",
    "month",
    "is_weekend",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn kind(&self) -> &'static str {
        match self {
            FeatureValue::Number(_) => "number",
            FeatureValue::Category(_) => "category",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureRow {
    entries: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_number(&mut self, name: &str, value: f64) {
        self.entries.push((name.to_string(), FeatureValue::Number(value)));
    }

    pub fn push_category(&mut self, name: &str, value: &str) {
        self.entries
            .push((name.to_string(), FeatureValue::Category(value.to_string())));
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn entries(&self) -> &[(String, FeatureValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn is_categorical(column: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&column)
}

pub fn numeric_columns() -> Vec<&'static str> {
    FEATURE_COLUMNS
        .iter()
        .copied()
        .filter(|column| !is_categorical(column))
        .collect()
}
