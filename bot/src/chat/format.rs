//! Plain-text renderings for chat replies

use std::fmt::Write;

use bot_api::models::AnalyticsResponse;

use crate::models::report::{BatchOutcome, WorkflowReport, WorkflowStatus};

pub const HELP: &str = "Lead bot commands:\n\
/process <url> - run the full workflow for one practice website\n\
/batch <url> <url> ... - process several websites\n\
/search <practice type> [in <location>] - discover and process practices\n\
/status - current phase and running workflows\n\
/stats - totals over recent results\n\
/help - this message";

pub const WELCOME: &str = "Hi! Send /process <url> with a practice website and I will build its demo.";

fn status_icon(status: WorkflowStatus) -> &'static str {
    match status {
        WorkflowStatus::Complete => "✅",
        WorkflowStatus::PartialSuccess => "⚠️",
        WorkflowStatus::Failed => "❌",
    }
}

fn phase_line(out: &mut String, label: &str, success: bool, fallback: bool, detail: &str) {
    let mark = match (success, fallback) {
        (true, false) => "ok",
        (true, true) => "ok (fallback)",
        (false, true) => "fallback",
        (false, false) => "failed",
    };
    let _ = writeln!(out, "• {}: {}{}", label, mark, detail);
}

/// Report summary sent after a workflow finishes
pub fn format_report(report: &WorkflowReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {} ({})",
        status_icon(report.workflow_status),
        report.practice_name(),
        report.workflow_status
    );
    let _ = writeln!(out, "{}", report.target.url);

    phase_line(
        &mut out,
        "Scrape",
        report.scrape.success,
        report.scrape.fallback_used,
        "",
    );
    phase_line(
        &mut out,
        "Voice agent",
        report.voice_agent.success,
        report.voice_agent.fallback_used,
        &format!(" [{}]", report.voice_agent.payload.agent_id),
    );
    phase_line(
        &mut out,
        "Lead",
        report.notion.success,
        report.notion.fallback_used,
        &format!(" [{}]", report.notion.payload.lead_score),
    );
    let method = report.deployment.method.as_deref().unwrap_or("none");
    phase_line(
        &mut out,
        "Deploy",
        report.deployment.success,
        report.deployment.fallback_used,
        &format!(" [{}]", method),
    );

    match report.deployment_url() {
        Some(url) if report.deployment.payload.is_mock => {
            let _ = writeln!(out, "Demo (mock): {}", url);
        }
        Some(url) => {
            let _ = writeln!(out, "Demo: {}", url);
        }
        None => {}
    }
    let _ = write!(out, "Took {:.1}s", report.duration_ms as f64 / 1000.0);
    out
}

/// One line per batch target
pub fn format_batch(outcomes: &[BatchOutcome]) -> String {
    let reported = outcomes.iter().filter(|o| o.report().is_some()).count();
    let mut out = format!("Batch finished: {}/{} reported\n", reported, outcomes.len());
    for outcome in outcomes {
        match outcome {
            BatchOutcome::Report(report) => {
                let _ = writeln!(
                    out,
                    "{} {} - {}",
                    status_icon(report.workflow_status),
                    report.practice_name(),
                    report.deployment_url().unwrap_or("no demo")
                );
            }
            BatchOutcome::Failed { target, error } => {
                let _ = writeln!(out, "❌ {} - {}", target, error);
            }
        }
    }
    out.trim_end().to_string()
}

pub fn format_status(current_phase: &str, in_flight: usize, total: usize) -> String {
    format!(
        "Current phase: {}\nRunning workflows: {}\nReports kept: {}",
        current_phase, in_flight, total
    )
}

pub fn format_analytics(summary: &AnalyticsResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Processed: {}", summary.total);
    let _ = writeln!(
        out,
        "Complete: {} | Partial: {} | Failed: {}",
        summary.complete, summary.partial_success, summary.failed
    );
    let _ = writeln!(
        out,
        "Deployments: {} ({} mock)",
        summary.deployments, summary.mock_deployments
    );
    for phase in &summary.phases {
        let _ = writeln!(
            out,
            "{}: {} ok, {} fallback, {} failed",
            phase.phase, phase.successes, phase.fallbacks, phase.failures
        );
    }
    let _ = write!(out, "Average duration: {}ms", summary.average_duration_ms);
    out
}
