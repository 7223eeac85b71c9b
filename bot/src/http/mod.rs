pub mod chat;
pub mod client;
pub mod hosting;
pub mod leads;
pub mod repo;
pub mod scraper;
pub mod search;
pub mod voice;
