//! Workflow controller
//!
//! Drives one target through the phase sequence. Collaborator failures are
//! caught at the phase boundary and replaced by fallback data, so
//! `process_target` always returns a complete report.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::results::ResultsLog;
use crate::errors::BotError;
use crate::models::deployment::DeploymentRecord;
use crate::models::lead::LeadRecord;
use crate::models::practice::{AgentRef, PracticeRecord, Target};
use crate::models::report::{
    FallbackReason, PhaseName, PhaseResult, WorkflowReport, WorkflowStatus,
};
use crate::providers::{LeadStore, Scraper, VoiceAgentProvider};
use crate::storage::settings::WorkflowSettings;
use crate::workflow::fallback::{fallback_agent_id, fallback_practice};
use crate::workflow::sanitize::sanitize_lead;
use crate::workflow::strategy::{run_strategies, DeployContext, DeploymentStrategy};
use crate::workflow::template::render_template;
use crate::workflow::tracker::PhaseTracker;
use crate::workflow::{elapsed_ms, with_timeout};

const SCRAPER: &str = "scraper";
const VOICE_PROVIDER: &str = "voice provider";
const LEAD_DATABASE: &str = "lead database";

/// Collaborators the controller calls, one per phase
#[derive(Clone)]
pub struct Collaborators {
    pub scraper: Arc<dyn Scraper>,
    pub voice: Arc<dyn VoiceAgentProvider>,
    pub leads: Arc<dyn LeadStore>,
    /// Deployment strategies in priority order
    pub strategies: Vec<Arc<dyn DeploymentStrategy>>,
}

/// Controller options
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Upper bound for each collaborator call
    pub call_timeout: Duration,

    /// Reports kept in the results log
    pub results_capacity: usize,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            results_capacity: 500,
        }
    }
}

impl ControllerOptions {
    pub fn from_settings(settings: &WorkflowSettings) -> Self {
        Self {
            call_timeout: Duration::from_secs(settings.call_timeout_secs.max(1)),
            results_capacity: settings.results_capacity,
        }
    }
}

pub struct WorkflowController {
    collaborators: Collaborators,
    options: ControllerOptions,
    tracker: Arc<PhaseTracker>,
    results: Arc<ResultsLog>,
}

impl WorkflowController {
    pub fn new(collaborators: Collaborators, options: ControllerOptions) -> Self {
        let results = Arc::new(ResultsLog::new(options.results_capacity));
        Self {
            collaborators,
            options,
            tracker: Arc::new(PhaseTracker::new()),
            results,
        }
    }

    pub fn tracker(&self) -> &Arc<PhaseTracker> {
        &self.tracker
    }

    pub fn results(&self) -> &Arc<ResultsLog> {
        &self.results
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Deployment strategy names in the order they are tried
    pub fn strategy_names(&self) -> Vec<String> {
        self.collaborators
            .strategies
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Run every phase for one target
    pub async fn process_target(&self, target: Target) -> WorkflowReport {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();
        let mut fallbacks = Vec::new();

        info!("Processing {} ({})", target.url, id);

        let tracking = self.tracker.start(id, &target.url);
        let scrape = self.scrape_phase(&target, id).await;
        note_fallback(&mut fallbacks, &scrape);

        let record = &scrape.payload;

        tracking.enter(PhaseName::VoiceAgent);
        let voice_agent = self.voice_phase(record).await;
        note_fallback(&mut fallbacks, &voice_agent);

        let agent_id = voice_agent.payload.agent_id.clone();

        tracking.enter(PhaseName::LeadStorage);
        let notion = self.lead_phase(record, &agent_id).await;
        note_fallback(&mut fallbacks, &notion);

        tracking.enter(PhaseName::Deployment);
        let deployment = self.deployment_phase(record, &agent_id).await;
        note_deployment_fallback(&mut fallbacks, &deployment);

        tracking.enter(PhaseName::Finalize);

        let mut report = WorkflowReport {
            id,
            target,
            workflow_status: WorkflowStatus::Failed,
            scrape,
            voice_agent,
            notion,
            deployment,
            fallbacks,
            started_at,
            finished_at: Utc::now(),
            duration_ms: elapsed_ms(clock),
        };
        report.workflow_status =
            WorkflowStatus::from_counts(report.success_count(), PhaseName::REPORTED.len());

        info!(
            "[{}] Workflow {} in {}ms ({}/{} phases succeeded, {} fallbacks)",
            report.scrape.payload.slug,
            report.workflow_status,
            report.duration_ms,
            report.success_count(),
            PhaseName::REPORTED.len(),
            report.fallbacks.len()
        );

        self.results.push(report.clone());
        drop(tracking);
        report
    }

    async fn scrape_phase(
        &self,
        target: &Target,
        workflow_id: Uuid,
    ) -> PhaseResult<PracticeRecord> {
        let started = Instant::now();
        let outcome = with_timeout(
            SCRAPER,
            self.options.call_timeout,
            self.collaborators.scraper.scrape(target),
        )
        .await
        .and_then(validate_practice);

        let timestamp = Utc::now().timestamp_millis();
        let result = match outcome {
            Ok(mut record) => {
                if record.website.trim().is_empty() {
                    record.website = target.url.clone();
                }
                if record.practice_type.is_none() {
                    record.practice_type = target.practice_type.clone();
                }
                record.assign_slug(timestamp, workflow_id);
                debug!("[{}] Scraped {}", record.slug, target.url);
                PhaseResult::succeeded(PhaseName::Scrape, record).with_method(SCRAPER)
            }
            Err(e) => {
                warn!("Scrape of {} failed, using fallback record: {}", target.url, e);
                let mut record = fallback_practice(target);
                record.assign_slug(timestamp, workflow_id);
                PhaseResult::degraded(PhaseName::Scrape, record, &e).with_method("fallback")
            }
        };

        result.with_duration(elapsed_ms(started))
    }

    async fn voice_phase(&self, record: &PracticeRecord) -> PhaseResult<AgentRef> {
        let started = Instant::now();
        let outcome = with_timeout(
            VOICE_PROVIDER,
            self.options.call_timeout,
            self.collaborators.voice.create_agent(record),
        )
        .await
        .and_then(|agent_id| {
            let agent_id = agent_id.trim().to_string();
            if agent_id.is_empty() {
                Err(BotError::Validation(
                    "Voice provider returned an empty agent id".to_string(),
                ))
            } else {
                Ok(agent_id)
            }
        });

        let result = match outcome {
            Ok(agent_id) => {
                debug!("[{}] Created voice agent {}", record.slug, agent_id);
                PhaseResult::succeeded(
                    PhaseName::VoiceAgent,
                    AgentRef {
                        agent_id,
                        is_fallback: false,
                    },
                )
            }
            Err(e) => {
                warn!("[{}] Voice agent creation failed: {}", record.slug, e);
                let agent = AgentRef {
                    agent_id: fallback_agent_id(Utc::now().timestamp_millis()),
                    is_fallback: true,
                };
                PhaseResult::degraded(PhaseName::VoiceAgent, agent, &e)
            }
        };

        result.with_duration(elapsed_ms(started))
    }

    async fn lead_phase(&self, record: &PracticeRecord, agent_id: &str) -> PhaseResult<LeadRecord> {
        let started = Instant::now();
        let lead = sanitize_lead(record, agent_id);

        let outcome = with_timeout(
            LEAD_DATABASE,
            self.options.call_timeout,
            self.collaborators.leads.store_lead(&lead),
        )
        .await
        .and_then(|lead_id| {
            if lead_id.trim().is_empty() {
                Err(BotError::Validation(
                    "Lead database returned an empty id".to_string(),
                ))
            } else {
                Ok(lead_id)
            }
        });

        let result = match outcome {
            Ok(lead_id) => {
                debug!("[{}] Stored lead {}", record.slug, lead_id);
                PhaseResult::succeeded(PhaseName::LeadStorage, lead.stored(lead_id))
            }
            Err(e) => {
                warn!("[{}] Lead storage failed, keeping local record: {}", record.slug, e);
                PhaseResult::degraded(PhaseName::LeadStorage, lead.fallback(), &e)
            }
        };

        result.with_duration(elapsed_ms(started))
    }

    async fn deployment_phase(
        &self,
        record: &PracticeRecord,
        agent_id: &str,
    ) -> PhaseResult<DeploymentRecord> {
        let started = Instant::now();
        let ctx = DeployContext {
            record: record.clone(),
            agent_id: agent_id.to_string(),
            files: render_template(record, agent_id),
            call_timeout: self.options.call_timeout,
        };

        let result = match run_strategies(&self.collaborators.strategies, &ctx).await {
            Ok(deployment) => {
                let primary = deployment.attempts.len() == 1;
                let method = deployment.method.clone();
                PhaseResult::succeeded(PhaseName::Deployment, deployment)
                    .with_method(method)
                    .with_fallback(!primary)
            }
            Err(exhausted) => {
                warn!("[{}] Deployment failed: {}", record.slug, exhausted.error);
                PhaseResult::failed(
                    PhaseName::Deployment,
                    DeploymentRecord::failed(exhausted.attempts),
                    &exhausted.error,
                )
                .with_method("none")
            }
        };

        result.with_duration(elapsed_ms(started))
    }
}

/// Reject records that cannot identify a practice
fn validate_practice(record: PracticeRecord) -> Result<PracticeRecord, BotError> {
    if record.name.trim().is_empty() {
        return Err(BotError::Validation(
            "Scraped record has an empty name".to_string(),
        ));
    }
    Ok(record)
}

fn note_fallback<T>(fallbacks: &mut Vec<FallbackReason>, result: &PhaseResult<T>) {
    if let Some(error) = result.error.as_ref() {
        fallbacks.push(FallbackReason {
            phase: result.phase,
            reason: error.clone(),
        });
    }
}

fn note_deployment_fallback(
    fallbacks: &mut Vec<FallbackReason>,
    result: &PhaseResult<DeploymentRecord>,
) {
    if result.error.is_some() {
        note_fallback(fallbacks, result);
        return;
    }
    if result.fallback_used {
        let failed: Vec<String> = result
            .payload
            .attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| format!("{}: {}", a.strategy, e)))
            .collect();
        fallbacks.push(FallbackReason {
            phase: result.phase,
            reason: failed.join("; "),
        });
    }
}
