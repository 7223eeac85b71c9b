//! Utility functions

use std::time::Duration;

use bot_api::models::{DiagnosticsResponse, ProviderStatus, VersionResponse, WorkflowSummary};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::storage::settings::Settings;

/// Version information for the bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Get version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    }
}

/// Cooldown options for exponential backoff
#[derive(Debug, Clone)]
pub struct CooldownOptions {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for CooldownOptions {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(300), // 5 minutes
            multiplier: 2.0,
        }
    }
}

/// Calculate exponential backoff delay
pub fn calc_exp_backoff(options: &CooldownOptions, attempt: u32) -> Duration {
    let delay_secs = options.base_delay.as_secs_f64() * options.multiplier.powi(attempt as i32);
    let capped_delay = delay_secs.min(options.max_delay.as_secs_f64());
    Duration::from_secs_f64(capped_delay)
}

/// Configuration snapshot served by `/diagnostics` and printed by `--diagnostic`
pub fn collect_diagnostics(settings: &Settings, strategies: Vec<String>) -> DiagnosticsResponse {
    let version = version_info();
    let providers = vec![
        ProviderStatus {
            name: "scraper".to_string(),
            configured: true,
        },
        ProviderStatus {
            name: "voice".to_string(),
            configured: settings.voice.api_key.is_some(),
        },
        ProviderStatus {
            name: "leads".to_string(),
            configured: settings.leads.api_key.is_some() && settings.leads.database_id.is_some(),
        },
        ProviderStatus {
            name: "repo_host".to_string(),
            configured: settings.repo_host.token.is_some(),
        },
        ProviderStatus {
            name: "hosting".to_string(),
            configured: settings.hosting.token.is_some(),
        },
        ProviderStatus {
            name: "chat".to_string(),
            configured: settings.chat.bot_token.is_some(),
        },
        ProviderStatus {
            name: "search".to_string(),
            configured: settings.search.api_key.is_some(),
        },
    ];

    DiagnosticsResponse {
        version: VersionResponse {
            version: version.version,
            git_hash: version.git_hash,
            build_time: version.build_time,
        },
        providers,
        workflow: WorkflowSummary {
            concurrency_limit: settings.workflow.concurrency_limit,
            batch_delay_ms: settings.workflow.batch_delay_ms,
            call_timeout_secs: settings.workflow.call_timeout_secs,
            results_capacity: settings.workflow.results_capacity,
            strategies,
        },
        chat_enabled: settings.chat.enabled && settings.chat.bot_token.is_some(),
    }
}

/// Print the configuration report to stdout
pub fn run_diagnostic(report: &DiagnosticsResponse) {
    println!("{}", "Lead bot diagnostics".bold());
    println!(
        "  version {} ({}, built {})",
        report.version.version, report.version.git_hash, report.version.build_time
    );

    println!("{}", "Providers".bold());
    for provider in &report.providers {
        let status = if provider.configured {
            "configured".green()
        } else {
            "not configured (fallbacks will be used)".yellow()
        };
        println!("  {:<10} {}", provider.name, status);
    }

    println!("{}", "Workflow".bold());
    println!("  concurrency limit  {}", report.workflow.concurrency_limit);
    println!("  batch delay        {}ms", report.workflow.batch_delay_ms);
    println!("  call timeout       {}s", report.workflow.call_timeout_secs);
    println!("  results kept       {}", report.workflow.results_capacity);
    println!("  strategies         {}", report.workflow.strategies.join(" -> "));

    let chat = if report.chat_enabled {
        "enabled".green()
    } else {
        "disabled".red()
    };
    println!("{} {}", "Chat worker".bold(), chat);
}
