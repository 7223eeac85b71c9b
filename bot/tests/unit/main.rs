//! Unit tests for the lead bot

mod common;

mod test_analytics;
mod test_chat_worker;
mod test_controller;
mod test_results;
mod test_runner;
mod test_server;
