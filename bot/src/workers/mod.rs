//! Background workers

pub mod chat;
