pub mod dashboard_handlers;
pub mod ops_handlers;
pub mod predict_handlers;
pub mod transaction_handlers;

pub use dashboard_handlers::*;
pub use ops_handlers::*;
pub use predict_handlers::*;
pub use transaction_handlers::*;
