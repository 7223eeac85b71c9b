//! Settings file management

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::BotError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Bot settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Emit JSON log lines
    #[serde(default)]
    pub json_logs: bool,

    /// Local HTTP server
    #[serde(default)]
    pub server: ServerSettings,

    /// Workflow controller tuning
    #[serde(default)]
    pub workflow: WorkflowSettings,

    /// Website scraper
    #[serde(default)]
    pub scraper: ScraperSettings,

    /// Voice-agent provider
    #[serde(default)]
    pub voice: ProviderSettings,

    /// Lead database
    #[serde(default)]
    pub leads: LeadsSettings,

    /// Source-repo host
    #[serde(default)]
    pub repo_host: RepoHostSettings,

    /// Deploy host
    #[serde(default)]
    pub hosting: HostingSettings,

    /// Chat-bot transport
    #[serde(default)]
    pub chat: ChatSettings,

    /// Search provider used for discovery
    #[serde(default)]
    pub search: ProviderSettings,
}

fn default_true() -> bool {
    true
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Workflow controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Targets processed concurrently per batch chunk
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,

    /// Pause between batch chunks
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    /// Upper bound for a single collaborator call
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Reports kept in memory
    #[serde(default = "default_results_capacity")]
    pub results_capacity: usize,

    /// Keep the mock deployment as the last strategy
    #[serde(default = "default_true")]
    pub enable_mock_deploy: bool,

    /// Pre-built demo repository reused by the template strategy, as `owner/name`
    #[serde(default)]
    pub shared_template_repo: Option<String>,

    /// Container image deployed by the direct service strategy
    #[serde(default = "default_demo_image")]
    pub demo_image: String,

    /// Domain used to fabricate mock deployment URLs
    #[serde(default = "default_mock_domain")]
    pub mock_domain: String,
}

fn default_concurrency_limit() -> usize {
    3
}

fn default_batch_delay_ms() -> u64 {
    2000
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_results_capacity() -> usize {
    500
}

fn default_demo_image() -> String {
    "ghcr.io/leadbot/practice-demo:latest".to_string()
}

fn default_mock_domain() -> String {
    "demo.leadbot.app".to_string()
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            batch_delay_ms: default_batch_delay_ms(),
            call_timeout_secs: default_call_timeout_secs(),
            results_capacity: default_results_capacity(),
            enable_mock_deploy: true,
            shared_template_repo: None,
            demo_image: default_demo_image(),
            mock_domain: default_mock_domain(),
        }
    }
}

/// Scraper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

fn default_user_agent() -> String {
    format!("leadbot/{}", env!("CARGO_PKG_VERSION"))
}

fn default_scrape_timeout() -> u64 {
    20
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_scrape_timeout(),
        }
    }
}

/// Generic API-key provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,
}

/// Lead database settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadsSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub database_id: Option<String>,
}

/// Source-repo host settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepoHostSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,

    /// Account that owns created repositories
    #[serde(default)]
    pub owner: Option<String>,
}

/// Deploy host settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostingSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub token: Option<String>,
}

/// Chat transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSettings {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub bot_token: Option<String>,

    /// Run the command worker
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Long-poll timeout passed to the transport
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// Chat that receives every finished report
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
}

fn default_poll_timeout() -> u64 {
    25
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            bot_token: None,
            enabled: true,
            poll_timeout_secs: default_poll_timeout(),
            admin_chat_id: None,
        }
    }
}

impl Settings {
    /// Load settings from file, falling back to defaults when the file is missing
    pub async fn load(file: &File) -> Result<Self, BotError> {
        let mut settings = match file.read_json::<Settings>().await? {
            Some(settings) => {
                info!("Loaded settings from {:?}", file.path());
                settings
            }
            None => {
                debug!("No settings file at {:?}, using defaults", file.path());
                Settings::default()
            }
        };
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Override secrets and accounts from the environment
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = Some(value);
            }
        };

        set(&mut self.voice.api_key, "LEADBOT_VOICE_API_KEY");
        set(&mut self.leads.api_key, "LEADBOT_LEADS_API_KEY");
        set(&mut self.leads.database_id, "LEADBOT_LEADS_DATABASE_ID");
        set(&mut self.repo_host.token, "LEADBOT_REPO_TOKEN");
        set(&mut self.repo_host.owner, "LEADBOT_REPO_OWNER");
        set(&mut self.hosting.token, "LEADBOT_HOSTING_TOKEN");
        set(&mut self.chat.bot_token, "LEADBOT_CHAT_BOT_TOKEN");
        set(&mut self.search.api_key, "LEADBOT_SEARCH_API_KEY");
    }
}
