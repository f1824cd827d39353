use crate::entities::{DashboardCounts, DashboardSummary};

impl DashboardSummary {
    pub fn from_counts(counts: DashboardCounts) -> Self {
        let fraud_percentage = if counts.total == 0 {
            0.0
        } else {
            counts.fraud as f64 / counts.total as f64 * 100.0
        };
        Self {
            total_transactions: counts.total,
            fraud_count: counts.fraud,
            fraud_percentage,
            transaction_by_category: counts.by_category.into_iter().collect(),
        }
    }
}
