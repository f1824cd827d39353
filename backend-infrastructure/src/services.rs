pub mod notification_scheduler;
pub mod notification_service;
pub mod report_service;
pub mod transaction_sender;

pub use notification_scheduler::*;
pub use notification_service::*;
pub use report_service::*;
pub use transaction_sender::*;
