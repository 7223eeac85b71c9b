//! Fault-tolerant lead workflow
//!
//! A target URL is driven through scrape, voice agent, lead storage and
//! deployment. Each phase degrades to locally synthesized data when its
//! collaborator fails, so a report is always produced.

pub mod batch;
pub mod controller;
pub mod fallback;
pub mod runner;
pub mod sanitize;
pub mod strategy;
pub mod template;
pub mod tracker;

use std::future::Future;
use std::time::{Duration, Instant};

use crate::errors::BotError;

/// Bound a collaborator call; expiry becomes `BotError::Timeout`
pub async fn with_timeout<T, F>(service: &str, after: Duration, fut: F) -> Result<T, BotError>
where
    F: Future<Output = Result<T, BotError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(BotError::Timeout {
            service: service.to_string(),
            after,
        }),
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u64::MAX as u128) as u64
}
