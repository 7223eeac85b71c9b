//! Chat command worker
//!
//! Long-polls the chat transport, parses commands and replies with the
//! workflow results. Each command runs on its own task so a slow batch
//! never blocks polling.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::chat::commands::{parse_command, Command};
use crate::chat::format::{
    format_analytics, format_batch, format_report, format_status, HELP, WELCOME,
};
use crate::http::chat::fit_message;
use crate::providers::ChatTransport;
use crate::utils::{calc_exp_backoff, CooldownOptions};
use crate::workflow::runner::WorkflowRunner;

/// Chat worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Long-poll timeout passed to the transport
    pub poll_timeout: Duration,

    /// Backoff after failed polls
    pub cooldown: CooldownOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(25),
            cooldown: CooldownOptions::default(),
        }
    }
}

/// Run the chat worker
pub async fn run<S, F>(
    options: &Options,
    runner: WorkflowRunner,
    transport: Arc<dyn ChatTransport>,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Chat worker starting...");

    let mut offset: i64 = 0;
    let mut failures: u32 = 0;
    let mut tasks = JoinSet::new();

    loop {
        while let Some(result) = tasks.try_join_next() {
            if let Err(e) = result {
                error!("Chat command task failed: {}", e);
            }
        }

        let polled = tokio::select! {
            _ = &mut shutdown_signal => break,
            polled = transport.get_updates(offset, options.poll_timeout.as_secs()) => polled,
        };

        match polled {
            Ok(updates) => {
                failures = 0;
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if update.chat_id == 0 {
                        continue;
                    }
                    let Some(command) = parse_command(&update.text) else {
                        continue;
                    };

                    debug!("Chat {} sent {:?}", update.chat_id, command);
                    tasks.spawn(handle_command(
                        command,
                        update.chat_id,
                        runner.clone(),
                        transport.clone(),
                    ));
                }
            }
            Err(e) => {
                let wait = calc_exp_backoff(&options.cooldown, failures);
                failures = failures.saturating_add(1);
                warn!("Failed to poll chat updates: {}, retrying in {:?}", e, wait);

                tokio::select! {
                    _ = &mut shutdown_signal => break,
                    _ = sleep_fn(wait) => {}
                }
            }
        }
    }

    info!("Chat worker shutting down...");
    if !tasks.is_empty() {
        warn!("Abandoning {} running chat commands", tasks.len());
    }
    tasks.shutdown().await;
}

/// Reply sent before a long-running command starts
pub fn acknowledgement(command: &Command) -> Option<String> {
    match command {
        Command::Process(url) => Some(format!("Processing {}...", url)),
        Command::Batch(urls) => Some(format!("Processing {} websites...", urls.len())),
        Command::Search(query) => Some(format!("Searching for {}...", query.query_text())),
        _ => None,
    }
}

/// Run a command and render the final reply
pub async fn execute(command: Command, runner: &WorkflowRunner) -> String {
    match command {
        Command::Start => WELCOME.to_string(),
        Command::Help => HELP.to_string(),
        Command::Usage(usage) => format!("Usage: {}", usage),
        Command::Unknown(name) => format!("Unknown command /{}. Send /help for the list.", name),
        Command::Status => format_status(
            &runner.current_phase(),
            runner.in_flight().len(),
            runner.total_results(),
        ),
        Command::Stats => format_analytics(&runner.analytics()),
        Command::Process(url) => match runner.process_url(&url).await {
            Ok(report) => format_report(&report),
            Err(e) => format!("Cannot process {}: {}", url, e),
        },
        Command::Batch(urls) => format_batch(&runner.process_batch(urls).await),
        Command::Search(query) => match runner.process_search(query).await {
            Ok(outcomes) if outcomes.is_empty() => "No practice websites found.".to_string(),
            Ok(outcomes) => format_batch(&outcomes),
            Err(e) => format!("Search failed: {}", e),
        },
    }
}

async fn handle_command(
    command: Command,
    chat_id: i64,
    runner: WorkflowRunner,
    transport: Arc<dyn ChatTransport>,
) {
    if let Some(ack) = acknowledgement(&command) {
        reply(transport.as_ref(), chat_id, &ack).await;
    }
    let text = execute(command, &runner).await;
    reply(transport.as_ref(), chat_id, &text).await;
}

async fn reply(transport: &dyn ChatTransport, chat_id: i64, text: &str) {
    if let Err(e) = transport.send_message(chat_id, &fit_message(text)).await {
        error!("Failed to reply to chat {}: {}", chat_id, e);
    }
}
