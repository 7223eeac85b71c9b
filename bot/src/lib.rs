//! Lead bot library
//!
//! Turns a healthcare practice website into a scraped profile, a voice
//! receptionist, a stored lead and a deployed demo site, degrading to
//! fallbacks whenever a collaborator fails.

pub mod analytics;
pub mod app;
pub mod cache;
pub mod chat;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod providers;
pub mod server;
pub mod storage;
pub mod utils;
pub mod workers;
pub mod workflow;
