//! Provider wire models

pub mod chat;
pub mod hosting;
pub mod leads;
pub mod repo;
pub mod search;
pub mod voice;
