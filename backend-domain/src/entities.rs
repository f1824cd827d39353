// Domain entities
pub mod dashboard;
pub mod dataset;
pub mod fraud_detection;
pub mod model;
pub mod notifier;
pub mod runtime_config;
pub mod transaction;

pub use dashboard::*;
pub use dataset::*;
pub use fraud_detection::*;
pub use model::*;
pub use notifier::*;
pub use runtime_config::*;
pub use transaction::*;
