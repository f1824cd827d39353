// Pure domain services
pub mod dashboard;
pub mod features;
pub mod geo;
pub mod synthetic;
pub mod validation;

pub use features::*;
pub use geo::*;
pub use synthetic::*;
pub use validation::*;
