//! Analytics tests

use std::sync::Arc;

use leadbot::analytics::{deployments, summarize};
use leadbot::models::practice::Target;

use crate::common::{
    collaborators, controller, healthy_controller, FakeLeads, FakeScraper, FakeStrategy, FakeVoice,
};

#[test]
fn test_empty_summary() {
    let summary = summarize(&[]);
    assert_eq!(summary.total, 0);
    assert_eq!(summary.average_duration_ms, 0);
    assert_eq!(summary.phases.len(), 4);
    assert!(deployments(&[]).is_empty());
}

#[tokio::test]
async fn test_summary_counts_statuses_phases_and_methods() {
    let healthy = healthy_controller();
    let degraded = controller(collaborators(
        Arc::new(FakeScraper::failing()),
        Arc::new(FakeVoice::ok("agent-123")),
        Arc::new(FakeLeads::failing()),
        &[
            FakeStrategy::failing("full-remote-deploy", "401"),
            FakeStrategy::mock("emergency-mock", "https://acme.demo.leadbot.app"),
        ],
    ));
    let broken = controller(collaborators(
        Arc::new(FakeScraper::failing()),
        Arc::new(FakeVoice::failing()),
        Arc::new(FakeLeads::failing()),
        &[],
    ));

    let reports = vec![
        healthy.process_target(Target::new("a.com").unwrap()).await,
        degraded.process_target(Target::new("b.com").unwrap()).await,
        broken.process_target(Target::new("c.com").unwrap()).await,
    ];
    let summary = summarize(&reports);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.complete, 1);
    assert_eq!(summary.partial_success, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.degraded, 2);
    assert_eq!(summary.deployments, 2);
    assert_eq!(summary.mock_deployments, 1);
    assert_eq!(summary.methods.get("emergency-mock"), Some(&1));
    assert_eq!(summary.methods.get("full-remote-deploy"), Some(&1));

    let scrape = &summary.phases[0];
    assert_eq!(scrape.phase, "scrape");
    assert_eq!((scrape.successes, scrape.failures, scrape.fallbacks), (1, 2, 2));

    let deployment = &summary.phases[3];
    assert_eq!((deployment.successes, deployment.failures, deployment.fallbacks), (2, 1, 1));

    let listed = deployments(&reports);
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].target_url, "https://b.com");
    assert!(listed[0].is_mock);
}
