//! Workflow runner: the entry point used by the HTTP API and the chat worker

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bot_api::models::{AnalyticsResponse, DeploymentEntry};
use tracing::{info, warn};

use crate::analytics;
use crate::cache::results::ResultsFilter;
use crate::chat::format::format_report;
use crate::errors::BotError;
use crate::models::practice::{DiscoveryQuery, Target};
use crate::models::report::{BatchOutcome, WorkflowReport};
use crate::providers::{ChatTransport, Discoverer};
use crate::workflow::batch::BatchLimiter;
use crate::workflow::controller::WorkflowController;
use crate::workflow::tracker::InFlight;
use crate::workflow::with_timeout;

/// Chat that receives every finished report
struct ReportNotifier {
    transport: Arc<dyn ChatTransport>,
    chat_id: i64,
}

struct RunnerInner {
    controller: WorkflowController,
    limiter: BatchLimiter,
    discoverer: Option<Arc<dyn Discoverer>>,
    notifier: Option<ReportNotifier>,
}

/// Owns the controller, its results log and phase state
#[derive(Clone)]
pub struct WorkflowRunner {
    inner: Arc<RunnerInner>,
}

/// Runner builder
pub struct WorkflowRunnerBuilder {
    controller: WorkflowController,
    limiter: BatchLimiter,
    discoverer: Option<Arc<dyn Discoverer>>,
    notifier: Option<ReportNotifier>,
}

impl WorkflowRunnerBuilder {
    pub fn with_discoverer(mut self, discoverer: Arc<dyn Discoverer>) -> Self {
        self.discoverer = Some(discoverer);
        self
    }

    pub fn with_notifier(mut self, transport: Arc<dyn ChatTransport>, chat_id: i64) -> Self {
        self.notifier = Some(ReportNotifier { transport, chat_id });
        self
    }

    pub fn build(self) -> WorkflowRunner {
        WorkflowRunner {
            inner: Arc::new(RunnerInner {
                controller: self.controller,
                limiter: self.limiter,
                discoverer: self.discoverer,
                notifier: self.notifier,
            }),
        }
    }
}

impl WorkflowRunner {
    pub fn builder(controller: WorkflowController, limiter: BatchLimiter) -> WorkflowRunnerBuilder {
        WorkflowRunnerBuilder {
            controller,
            limiter,
            discoverer: None,
            notifier: None,
        }
    }

    pub fn new(controller: WorkflowController, limiter: BatchLimiter) -> Self {
        Self::builder(controller, limiter).build()
    }

    pub fn controller(&self) -> &WorkflowController {
        &self.inner.controller
    }

    pub fn concurrency_limit(&self) -> usize {
        self.inner.limiter.concurrency_limit()
    }

    pub fn has_discoverer(&self) -> bool {
        self.inner.discoverer.is_some()
    }

    /// Run the workflow for one target
    pub async fn process_target(&self, target: Target) -> WorkflowReport {
        let report = self.inner.controller.process_target(target).await;
        self.notify(&report).await;
        report
    }

    /// Validate a raw URL and run the workflow for it
    pub async fn process_url(&self, url: &str) -> Result<WorkflowReport, BotError> {
        let target = Target::new(url)?;
        Ok(self.process_target(target).await)
    }

    /// Run the workflow for many URLs with bounded concurrency
    pub async fn process_batch(&self, urls: Vec<String>) -> Vec<BatchOutcome> {
        self.run_batch(urls, None, None).await
    }

    /// Discover practice websites and process them
    pub async fn process_search(&self, query: DiscoveryQuery) -> Result<Vec<BatchOutcome>, BotError> {
        let discoverer = self
            .inner
            .discoverer
            .as_ref()
            .ok_or_else(|| BotError::Config("No discovery provider configured".to_string()))?;

        let urls = with_timeout(
            "discovery",
            self.inner.controller.options().call_timeout,
            discoverer.discover(&query),
        )
        .await?;

        let mut seen = HashSet::new();
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty() && seen.insert(url.to_lowercase()))
            .take(query.limit)
            .collect();

        info!(
            "Discovered {} websites for \"{}\"",
            urls.len(),
            query.query_text()
        );

        Ok(self
            .run_batch(urls, Some(query.practice_type.clone()), query.location.clone())
            .await)
    }

    async fn run_batch(
        &self,
        urls: Vec<String>,
        practice_type: Option<String>,
        location: Option<String>,
    ) -> Vec<BatchOutcome> {
        let runner = self.clone();
        self.inner
            .limiter
            .run(urls, move |url| {
                let runner = runner.clone();
                let practice_type = practice_type.clone();
                let location = location.clone();
                async move {
                    match Target::new(&url) {
                        Ok(target) => {
                            let target = target.with_classification(practice_type, location);
                            BatchOutcome::Report(Box::new(runner.process_target(target).await))
                        }
                        Err(e) => BatchOutcome::Failed {
                            target: url,
                            error: e.to_string(),
                        },
                    }
                }
            })
            .await
    }

    /// Most recently entered phase, `idle` when nothing runs
    pub fn current_phase(&self) -> String {
        self.inner.controller.tracker().current_phase()
    }

    pub fn in_flight(&self) -> Vec<InFlight> {
        self.inner.controller.tracker().in_flight()
    }

    /// Logged reports matching the filter, newest first
    pub fn results(&self, filter: &ResultsFilter) -> Vec<WorkflowReport> {
        self.inner.controller.results().query(filter)
    }

    pub fn total_results(&self) -> usize {
        self.inner.controller.results().len()
    }

    pub fn results_capacity(&self) -> usize {
        self.inner.controller.results().capacity()
    }

    pub fn deployments(&self) -> Vec<DeploymentEntry> {
        analytics::deployments(&self.inner.controller.results().snapshot())
    }

    pub fn analytics(&self) -> AnalyticsResponse {
        analytics::summarize(&self.inner.controller.results().snapshot())
    }

    async fn notify(&self, report: &WorkflowReport) {
        let Some(notifier) = self.inner.notifier.as_ref() else {
            return;
        };

        let sent = with_timeout(
            "chat transport",
            Duration::from_secs(15),
            notifier
                .transport
                .send_message(notifier.chat_id, &format_report(report)),
        )
        .await;
        if let Err(e) = sent {
            warn!("Failed to send report notification: {}", e);
        }
    }
}
