pub mod notification_commands;
pub mod predict_commands;
