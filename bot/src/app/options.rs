//! Application configuration options

use std::time::Duration;

use crate::storage::settings::Settings;
use crate::utils::CooldownOptions;
use crate::workers::chat;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Lifecycle configuration
    pub lifecycle: LifecycleOptions,

    /// Enable local HTTP server
    pub enable_server: bool,

    /// Enable the chat command worker
    pub enable_chat_worker: bool,

    /// Server configuration
    pub server: ServerOptions,

    /// Chat worker options
    pub chat_worker: chat::Options,

    /// Provider credentials and workflow tuning
    pub settings: Settings,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleOptions::default(),
            enable_server: true,
            enable_chat_worker: true,
            server: ServerOptions::default(),
            chat_worker: chat::Options::default(),
            settings: Settings::default(),
        }
    }
}

impl AppOptions {
    /// Derive the run options from the loaded settings
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            enable_chat_worker: settings.chat.enabled && settings.chat.bot_token.is_some(),
            server: ServerOptions {
                host: settings.server.host.clone(),
                port: settings.server.port,
            },
            chat_worker: chat::Options {
                poll_timeout: Duration::from_secs(settings.chat.poll_timeout_secs),
                cooldown: CooldownOptions::default(),
            },
            settings,
            ..Default::default()
        }
    }
}

/// Lifecycle options for the bot
#[derive(Debug, Clone)]
pub struct LifecycleOptions {
    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for LifecycleOptions {
    fn default() -> Self {
        Self {
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}
