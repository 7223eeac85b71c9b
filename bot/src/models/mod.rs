//! Data model shared by the workflow, the server and the chat worker

pub mod deployment;
pub mod lead;
pub mod practice;
pub mod report;
