pub mod audit_queries;
pub mod dashboard_queries;
pub mod ops_queries;
pub mod transaction_queries;
