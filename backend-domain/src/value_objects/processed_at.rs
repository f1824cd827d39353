// Processed-at value object
// A transaction timestamp that may or may not carry a UTC offset

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const AWARE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessedAt {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl ProcessedAt {
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(aware) = DateTime::parse_from_rfc3339(trimmed) {
            return Some(ProcessedAt::Aware(aware));
        }
        for format in AWARE_FORMATS {
            if let Ok(aware) = DateTime::parse_from_str(trimmed, format) {
                return Some(ProcessedAt::Aware(aware));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Some(ProcessedAt::Naive(naive));
            }
        }
        None
    }

    pub fn is_naive(&self) -> bool {
        matches!(self, ProcessedAt::Naive(_))
    }
}

impl fmt::Display for ProcessedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessedAt::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S%.f")),
            ProcessedAt::Aware(aware) => write!(f, "{}", aware.to_rfc3339()),
        }
    }
}

impl From<DateTime<Utc>> for ProcessedAt {
    fn from(value: DateTime<Utc>) -> Self {
        ProcessedAt::Aware(value.into())
    }
}
