//! Aggregate statistics over finished reports

use std::collections::BTreeMap;

use bot_api::models::{AnalyticsResponse, DeploymentEntry, PhaseStats};

use crate::models::report::{PhaseName, WorkflowReport, WorkflowStatus};

/// Summarize reports into workflow and per-phase counters
pub fn summarize(reports: &[WorkflowReport]) -> AnalyticsResponse {
    let mut phases: Vec<PhaseStats> = PhaseName::REPORTED
        .iter()
        .map(|phase| PhaseStats {
            phase: phase.to_string(),
            ..PhaseStats::default()
        })
        .collect();
    let mut summary = AnalyticsResponse {
        total: reports.len(),
        ..AnalyticsResponse::default()
    };
    let mut methods: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration: u128 = 0;

    for report in reports {
        match report.workflow_status {
            WorkflowStatus::Complete => summary.complete += 1,
            WorkflowStatus::PartialSuccess => summary.partial_success += 1,
            WorkflowStatus::Failed => summary.failed += 1,
        }
        if report.is_degraded() {
            summary.degraded += 1;
        }

        for (stats, (_, success, fallback)) in phases.iter_mut().zip(report.phase_successes()) {
            if success {
                stats.successes += 1;
            } else {
                stats.failures += 1;
            }
            if fallback {
                stats.fallbacks += 1;
            }
        }

        if report.deployment_url().is_some() {
            summary.deployments += 1;
            if report.deployment.payload.is_mock {
                summary.mock_deployments += 1;
            }
            *methods
                .entry(report.deployment.payload.method.clone())
                .or_default() += 1;
        }

        total_duration += u128::from(report.duration_ms);
    }

    if !reports.is_empty() {
        summary.average_duration_ms = (total_duration / reports.len() as u128) as u64;
    }
    summary.phases = phases;
    summary.methods = methods;
    summary
}

/// Deployed demos, newest first
pub fn deployments(reports: &[WorkflowReport]) -> Vec<DeploymentEntry> {
    reports
        .iter()
        .rev()
        .filter_map(|report| {
            let url = report.deployment_url()?;
            Some(DeploymentEntry {
                workflow_id: report.id,
                practice_name: report.practice_name().to_string(),
                target_url: report.target.url.clone(),
                url: url.to_string(),
                method: report.deployment.payload.method.clone(),
                is_mock: report.deployment.payload.is_mock,
                deployed_at: report.finished_at,
            })
        })
        .collect()
}
