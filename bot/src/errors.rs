//! Error types for the lead bot

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the lead bot
#[derive(Error, Debug)]
pub enum BotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} call failed: {message}")]
    RemoteCall { service: String, message: String },

    #[error("{service} call timed out after {after:?}")]
    Timeout { service: String, after: Duration },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("All {attempts} deployment strategies failed, last error: {last_error}")]
    ExhaustedStrategies { attempts: usize, last_error: String },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Shutdown error: {0}")]
    Shutdown(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        BotError::RemoteCall {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Classify the error into the failure taxonomy used by phase results
    pub fn kind(&self) -> FailureKind {
        match self {
            BotError::Validation(_) | BotError::InvalidTarget(_) => FailureKind::Validation,
            BotError::ExhaustedStrategies { .. } => FailureKind::ExhaustedStrategies,
            _ => FailureKind::RemoteCall,
        }
    }
}

impl From<anyhow::Error> for BotError {
    fn from(err: anyhow::Error) -> Self {
        BotError::Internal(err.to_string())
    }
}

/// Failure taxonomy recorded on a failed phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Collaborator threw, returned an error status or timed out
    RemoteCall,
    /// Collaborator answered with structurally invalid data
    Validation,
    /// Every deployment strategy failed
    ExhaustedStrategies,
}
