// Domain value objects
pub mod feature_row;
pub mod processed_at;

pub use feature_row::*;
pub use processed_at::*;
