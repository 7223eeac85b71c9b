//! Workflow controller tests

use std::sync::Arc;
use std::time::Duration;

use leadbot::cache::results::ResultsFilter;
use leadbot::errors::FailureKind;
use leadbot::models::deployment::DeploymentStatus;
use leadbot::models::lead::LeadStatus;
use leadbot::models::practice::Target;
use leadbot::models::report::{PhaseName, WorkflowStatus};
use leadbot::workflow::controller::{ControllerOptions, WorkflowController};
use leadbot::workflow::fallback::{FALLBACK_AGENT_PREFIX, FALLBACK_SUFFIX};
use leadbot::workflow::tracker::IDLE;

use crate::common::{
    collaborators, controller, healthy_controller, FakeLeads, FakeScraper, FakeStrategy, FakeVoice,
};

fn target(url: &str) -> Target {
    Target::new(url).unwrap()
}

#[tokio::test]
async fn test_all_phases_succeed() {
    let controller = healthy_controller();
    let report = controller
        .process_target(target("https://brightsmiles.com"))
        .await;

    assert_eq!(report.workflow_status, WorkflowStatus::Complete);
    assert_eq!(report.success_count(), 4);
    assert!(report.fallbacks.is_empty());
    assert!(!report.is_degraded());

    assert_eq!(report.practice_name(), "Practice brightsmiles.com");
    assert!(report.scrape.payload.slug.starts_with("practice-brightsmiles-com-"));
    assert_eq!(report.voice_agent.payload.agent_id, "agent-123");
    assert!(!report.voice_agent.payload.is_fallback);
    assert_eq!(report.notion.payload.status, LeadStatus::Stored);
    assert_eq!(report.notion.payload.lead_id.as_deref(), Some("lead-456"));
    assert_eq!(report.deployment.method.as_deref(), Some("full-remote-deploy"));
    assert_eq!(report.deployment_url(), Some("https://demo.example.app"));
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_scrape_failure_uses_hostname_fallback() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::failing()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ));

    let report = controller
        .process_target(target("https://www.bright-smiles.com/contact"))
        .await;

    assert!(!report.scrape.success);
    assert!(report.scrape.fallback_used);
    assert_eq!(report.scrape.error_kind, Some(FailureKind::RemoteCall));
    assert_eq!(
        report.practice_name(),
        format!("Bright Smiles {}", FALLBACK_SUFFIX)
    );
    assert_eq!(report.scrape.payload.website, "https://www.bright-smiles.com/contact");
    assert_eq!(report.workflow_status, WorkflowStatus::PartialSuccess);
    assert_eq!(report.fallbacks.len(), 1);
    assert_eq!(report.fallbacks[0].phase, PhaseName::Scrape);
}

#[tokio::test]
async fn test_same_url_yields_same_fallback_name() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::failing()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ));

    let first = controller.process_target(target("sunrise-dental.com")).await;
    let second = controller.process_target(target("sunrise-dental.com")).await;
    assert_eq!(first.practice_name(), second.practice_name());
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_empty_scraped_name_is_validation_failure() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::empty_name()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ));

    let report = controller.process_target(target("https://acme.com")).await;
    assert!(!report.scrape.success);
    assert_eq!(report.scrape.error_kind, Some(FailureKind::Validation));
    assert!(!report.practice_name().trim().is_empty());
}

#[tokio::test]
async fn test_voice_failure_generates_fallback_agent_used_downstream() {
    let leads = Arc::new(FakeLeads::ok("lead-456"));
    let strategy = FakeStrategy::ok("full-remote-deploy", "https://demo.example.app");
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::failing()),
        leads.clone(),
        &[strategy.clone()],
    ));

    let report = controller.process_target(target("https://acme.com")).await;
    let agent_id = report.voice_agent.payload.agent_id.clone();

    assert!(!report.voice_agent.success);
    assert!(report.voice_agent.payload.is_fallback);
    assert!(agent_id.starts_with(FALLBACK_AGENT_PREFIX));
    assert_eq!(report.workflow_status, WorkflowStatus::PartialSuccess);

    // Later phases run with the fallback identifier
    assert_eq!(leads.stored.lock().unwrap()[0].agent_id, agent_id);
    assert_eq!(strategy.agent_ids.lock().unwrap()[0], agent_id);
}

#[tokio::test]
async fn test_lead_failure_keeps_local_record() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::failing()),
        &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
    ));

    let report = controller.process_target(target("https://acme.com")).await;
    assert!(!report.notion.success);
    assert!(report.notion.fallback_used);
    assert_eq!(report.notion.payload.status, LeadStatus::Fallback);
    assert!(report.notion.payload.lead_id.is_none());
    assert_eq!(report.notion.payload.lead_score, 80);
    assert_eq!(report.workflow_status, WorkflowStatus::PartialSuccess);
    assert!(report.scrape.success && report.voice_agent.success && report.deployment.success);
    assert!(!report.scrape.fallback_used && !report.deployment.fallback_used);
}

#[tokio::test]
async fn test_strategies_tried_in_order_until_one_succeeds() {
    let first = FakeStrategy::failing("full-remote-deploy", "quota exceeded");
    let second = FakeStrategy::failing("existing-template-reuse", "no template");
    let third = FakeStrategy::ok("direct-service-create", "https://svc.example.app");
    let never = FakeStrategy::ok("emergency-mock", "https://mock.example.app");
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[first.clone(), second.clone(), third.clone(), never.clone()],
    ));

    let report = controller.process_target(target("https://acme.com")).await;

    assert_eq!((first.calls(), second.calls(), third.calls(), never.calls()), (1, 1, 1, 0));
    assert!(report.deployment.success);
    assert!(report.deployment.fallback_used);
    assert_eq!(report.deployment.method.as_deref(), Some("direct-service-create"));
    assert_eq!(report.deployment.payload.attempts.len(), 3);
    assert!(report.deployment.payload.attempts[2].error.is_none());
    assert_eq!(report.workflow_status, WorkflowStatus::Complete);
    assert!(report.is_degraded());

    let reason = &report.fallbacks[0];
    assert_eq!(reason.phase, PhaseName::Deployment);
    assert!(reason.reason.contains("quota exceeded"));
    assert!(reason.reason.contains("no template"));
}

#[tokio::test]
async fn test_mock_deployment_is_flagged() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[
            FakeStrategy::failing("full-remote-deploy", "401"),
            FakeStrategy::mock("emergency-mock", "https://acme.demo.leadbot.app"),
        ],
    ));

    let report = controller.process_target(target("https://acme.com")).await;
    assert!(report.deployment.payload.is_mock);
    assert_eq!(report.deployment_url(), Some("https://acme.demo.leadbot.app"));
}

#[tokio::test]
async fn test_everything_fails() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::failing()),
        Arc::new(FakeVoice::failing()),
        Arc::new(FakeLeads::failing()),
        &[
            FakeStrategy::failing("full-remote-deploy", "401"),
            FakeStrategy::failing("direct-service-create", "500"),
        ],
    ));

    let report = controller.process_target(target("https://acme.com")).await;

    assert_eq!(report.workflow_status, WorkflowStatus::Failed);
    assert_eq!(report.success_count(), 0);
    assert!(!report.deployment.success);
    assert!(!report.deployment.fallback_used);
    assert_eq!(report.deployment.error_kind, Some(FailureKind::ExhaustedStrategies));
    assert_eq!(report.deployment.payload.status, DeploymentStatus::Failed);
    assert_eq!(report.deployment.payload.attempts.len(), 2);
    assert!(report.deployment_url().is_none());
    assert_eq!(report.fallbacks.len(), 4);

    // Still a complete report with payloads for every phase
    assert!(!report.practice_name().is_empty());
    assert!(!report.voice_agent.payload.agent_id.is_empty());
}

#[tokio::test]
async fn test_no_strategies_is_exhausted() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[],
    ));

    let report = controller.process_target(target("https://acme.com")).await;
    assert!(!report.deployment.success);
    assert_eq!(report.workflow_status, WorkflowStatus::PartialSuccess);
}

#[tokio::test(start_paused = true)]
async fn test_slow_collaborator_times_out() {
    let controller = WorkflowController::new(
        collaborators(
            Arc::new(FakeScraper::ok().with_delay(Duration::from_secs(60))),
            Arc::new(FakeVoice::ok("agent-123")),
            Arc::new(FakeLeads::ok("lead-456")),
            &[FakeStrategy::ok("full-remote-deploy", "https://demo.example.app")],
        ),
        ControllerOptions {
            call_timeout: Duration::from_secs(2),
            ..Default::default()
        },
    );

    let report = controller.process_target(target("https://acme.com")).await;
    assert!(!report.scrape.success);
    assert!(report.scrape.fallback_used);
    assert_eq!(report.scrape.error_kind, Some(FailureKind::RemoteCall));
    assert!(report.scrape.error.as_deref().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_reports_are_logged_and_tracker_returns_to_idle() {
    let controller = healthy_controller();
    assert_eq!(controller.tracker().current_phase(), IDLE);

    controller.process_target(target("https://a.com")).await;
    controller.process_target(target("https://b.com")).await;

    assert_eq!(controller.tracker().current_phase(), IDLE);
    assert!(controller.tracker().in_flight().is_empty());

    let logged = controller.results().query(&ResultsFilter::default());
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[0].target.url, "https://b.com");
}

#[test]
fn test_strategy_names_in_order() {
    let controller = controller(collaborators(
        Arc::new(FakeScraper::ok()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::ok("lead-456")),
        &[
            FakeStrategy::ok("full-remote-deploy", "https://a.app"),
            FakeStrategy::mock("emergency-mock", "https://b.app"),
        ],
    ));
    assert_eq!(
        controller.strategy_names(),
        vec!["full-remote-deploy", "emergency-mock"]
    );
}
