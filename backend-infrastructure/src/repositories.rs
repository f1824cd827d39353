pub mod config_files;
pub mod dataset_csv;
pub mod sqlite_repo;

pub use config_files::*;
pub use dataset_csv::*;
pub use sqlite_repo::*;
