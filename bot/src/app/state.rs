//! Application state management

use std::sync::Arc;
use std::time::Duration;

use bot_api::models::DiagnosticsResponse;
use tracing::{info, warn};

use crate::errors::BotError;
use crate::http::chat::ChatClient;
use crate::http::hosting::HostingClient;
use crate::http::leads::LeadDatabaseClient;
use crate::http::repo::RepoHostClient;
use crate::http::scraper::HtmlScraper;
use crate::http::search::SearchClient;
use crate::http::voice::VoiceAgentClient;
use crate::providers::ChatTransport;
use crate::storage::settings::Settings;
use crate::utils::collect_diagnostics;
use crate::workflow::batch::BatchLimiter;
use crate::workflow::controller::{Collaborators, ControllerOptions, WorkflowController};
use crate::workflow::runner::WorkflowRunner;
use crate::workflow::strategy::default_strategies;

/// Main application state
pub struct AppState {
    /// Workflow entry point shared by the server and the chat worker
    pub runner: WorkflowRunner,

    /// Chat transport, present when a bot token is configured
    pub chat: Option<Arc<dyn ChatTransport>>,

    /// Configuration snapshot taken at startup
    pub diagnostics: DiagnosticsResponse,
}

impl AppState {
    /// Build the provider clients and the workflow runner
    pub fn init(settings: &Settings) -> Result<Self, BotError> {
        info!("Initializing application state...");

        let chat_client = Arc::new(ChatClient::new(&settings.chat)?);
        let chat: Option<Arc<dyn ChatTransport>> = if chat_client.is_configured() {
            Some(chat_client)
        } else {
            None
        };

        let controller = build_controller(settings)?;
        let diagnostics = collect_diagnostics(settings, controller.strategy_names());

        let limiter = BatchLimiter::new(
            settings.workflow.concurrency_limit,
            Duration::from_millis(settings.workflow.batch_delay_ms),
        );
        let mut builder = WorkflowRunner::builder(controller, limiter);

        if settings.search.api_key.is_some() {
            builder = builder.with_discoverer(Arc::new(SearchClient::new(&settings.search)?));
        }

        match (settings.chat.admin_chat_id, &chat) {
            (Some(chat_id), Some(transport)) => {
                builder = builder.with_notifier(transport.clone(), chat_id);
            }
            (Some(_), None) => {
                warn!("admin_chat_id is set but no chat bot token is configured");
            }
            _ => {}
        }

        Ok(Self {
            runner: builder.build(),
            chat,
            diagnostics,
        })
    }

    /// Shutdown application state
    pub async fn shutdown(&self) -> Result<(), BotError> {
        info!(
            "Shutting down application state ({} reports in memory)...",
            self.runner.total_results()
        );
        Ok(())
    }
}

/// Wire the HTTP-backed collaborators into a controller
pub fn build_controller(settings: &Settings) -> Result<WorkflowController, BotError> {
    let repo_host = Arc::new(RepoHostClient::new(&settings.repo_host)?);
    let deploy_host = Arc::new(HostingClient::new(&settings.hosting)?);

    let collaborators = Collaborators {
        scraper: Arc::new(HtmlScraper::new(&settings.scraper)?),
        voice: Arc::new(VoiceAgentClient::new(&settings.voice)?),
        leads: Arc::new(LeadDatabaseClient::new(&settings.leads)?),
        strategies: default_strategies(repo_host, deploy_host, &settings.workflow),
    };

    Ok(WorkflowController::new(
        collaborators,
        ControllerOptions::from_settings(&settings.workflow),
    ))
}
