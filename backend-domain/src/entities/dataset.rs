// Dataset entity
// One CSV row of the training dataset

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entities::TransactionCore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub merchant: String,
    pub category: String,
    pub amt: f64,
    pub gender: String,
    pub city: String,
    pub province: String,
    pub latitude: f64,
    pub longitude: f64,
    pub city_pop: i64,
    pub job: String,
    pub unix_time: i64,
    pub merch_latitude: f64,
    pub merch_longitude: f64,
    pub processed_at: String,
    #[serde(
        serialize_with = "serialize_python_bool",
        deserialize_with = "deserialize_flexible_bool"
    )]
    pub is_fraud: bool,
}

impl DatasetRecord {
    pub fn from_core(core: TransactionCore, processed_at: String, is_fraud: bool) -> Self {
        Self {
            merchant: core.merchant,
            category: core.category,
            amt: core.amt,
            gender: core.gender,
            city: core.city,
            province: core.province,
            latitude: core.latitude,
            longitude: core.longitude,
            city_pop: core.city_pop,
            job: core.job,
            unix_time: core.unix_time,
            merch_latitude: core.merch_latitude,
            merch_longitude: core.merch_longitude,
            processed_at,
            is_fraud,
        }
    }

    pub fn core(&self) -> TransactionCore {
        TransactionCore {
            merchant: self.merchant.clone(),
            category: self.category.clone(),
            amt: self.amt,
            gender: self.gender.clone(),
            city: self.city.clone(),
            province: self.province.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
            city_pop: self.city_pop,
            job: self.job.clone(),
            unix_time: self.unix_time,
            merch_latitude: self.merch_latitude,
            merch_longitude: self.merch_longitude,
        }
    }
}

// Datasets written by pandas carry `True`/`False`; accept numeric flags too.
fn deserialize_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" | "yes" => Ok(true),
        "false" | "0" | "0.0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid boolean value '{}'",
            other
        ))),
    }
}

fn serialize_python_bool<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(if *value { "True" } else { "False" })
}
