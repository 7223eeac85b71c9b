//! Server state

use bot_api::models::DiagnosticsResponse;

use crate::workflow::runner::WorkflowRunner;

/// Server state shared across handlers
pub struct ServerState {
    pub runner: WorkflowRunner,
    /// Configuration snapshot taken at startup
    pub diagnostics: DiagnosticsResponse,
}

impl ServerState {
    pub fn new(runner: WorkflowRunner, diagnostics: DiagnosticsResponse) -> Self {
        Self {
            runner,
            diagnostics,
        }
    }
}
