use chrono::{DateTime, Datelike, Duration, FixedOffset, Offset, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Transaction, TransactionCore};
use crate::value_objects::{FeatureRow, ProcessedAt};

/// Time-based features derived from the processed-at timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFeatures {
    pub hour: u32,
    pub day_of_week: u32,
    pub month: u32,
    pub is_weekend: u8,
}

/// Turns raw transactions into the feature rows the pipeline was fit on.
///
/// Naive timestamps are read in `naive_offset` and normalized to UTC before
/// any calendar field is extracted, so training and serving agree as long
/// as both sides use the same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDeriver {
    naive_offset: FixedOffset,
}

impl FeatureDeriver {
    pub fn new(naive_offset: FixedOffset) -> Self {
        Self { naive_offset }
    }

    pub fn utc() -> Self {
        Self {
            naive_offset: Utc.fix(),
        }
    }

    pub fn naive_offset(&self) -> FixedOffset {
        self.naive_offset
    }

    pub fn normalize(&self, processed_at: &ProcessedAt) -> DateTime<Utc> {
        match processed_at {
            ProcessedAt::Naive(naive) => {
                let shift = Duration::seconds(i64::from(self.naive_offset.local_minus_utc()));
                Utc.from_utc_datetime(&(*naive - shift))
            }
            ProcessedAt::Aware(aware) => aware.with_timezone(&Utc),
        }
    }

    pub fn derive(&self, processed_at: &ProcessedAt) -> DerivedFeatures {
        derive_from_utc(&self.normalize(processed_at))
    }

    pub fn feature_row(&self, core: &TransactionCore, processed_at: &ProcessedAt) -> FeatureRow {
        build_row(core, &self.derive(processed_at))
    }

    pub fn feature_row_for(&self, transaction: &Transaction) -> FeatureRow {
        build_row(&transaction.core, &derive_from_utc(&transaction.processed_at))
    }
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::utc()
    }
}

fn derive_from_utc(at: &DateTime<Utc>) -> DerivedFeatures {
    let day_of_week = at.weekday().num_days_from_monday();
    DerivedFeatures {
        hour: at.hour(),
        day_of_week,
        month: at.month(),
        is_weekend: u8::from(day_of_week >= 5),
    }
}

fn build_row(core: &TransactionCore, derived: &DerivedFeatures) -> FeatureRow {
    let mut row = FeatureRow::new();
    row.push_category("merchant", &core.merchant);
    row.push_category("category", &core.category);
    row.push_number("amt", core.amt);
    row.push_category("gender", &core.gender);
    row.push_category("city", &core.city);
    row.push_category("province", &core.province);
    row.push_number("latitude", core.latitude);
    row.push_number("longitude", core.longitude);
    row.push_number("city_pop", core.city_pop as f64);
    row.push_category("job", &core.job);
    row.push_number("unix_time", core.unix_time as f64);
    row.push_number("merch_latitude", core.merch_latitude);
    row.push_number("merch_longitude", core.merch_longitude);
    row.push_number("hour", f64::from(derived.hour));
    row.push_number("day_of_week", f64::from(derived.day_of_week));
    row.push_number("month", f64::from(derived.month));
    row.push_number("is_weekend", f64::from(derived.is_weekend));
    row
}
