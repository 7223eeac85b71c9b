pub mod commands;
pub mod format;
