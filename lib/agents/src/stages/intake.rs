use super::{StageDeps, vars};
use crate::prompts;
use async_trait::async_trait;
use tracing::info;
use triage_core::{Priority, TicketState};
use triage_workflow::{Stage, StageResult};

const HIGH_PRIORITY_KEYWORDS: [&str; 4] = ["urgent", "critical", "asap", "emergency"];
const LOW_PRIORITY_KEYWORDS: [&str; 3] = ["question", "wondering", "curious"];

/// Derives a priority from keywords in the customer's message.
///
/// High-priority keywords win over low-priority ones; no match is medium.
#[must_use]
pub fn priority_for(query: &str) -> Priority {
    let query = query.to_lowercase();
    if HIGH_PRIORITY_KEYWORDS.iter().any(|k| query.contains(k)) {
        Priority::High
    } else if LOW_PRIORITY_KEYWORDS.iter().any(|k| query.contains(k)) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Summarizes the ticket and sets its priority.
///
/// Owns `priority`.
#[derive(Debug, Clone)]
pub struct IntakeStage {
    deps: StageDeps,
}

impl IntakeStage {
    #[must_use]
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Stage<TicketState> for IntakeStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(ticket_id = %state.ticket_id(), "processing ticket intake");

        let summary = self
            .deps
            .generate(
                prompts::INTAKE_SUMMARY,
                &vars([("query", state.customer_query())]),
                self.deps.generator.default_temperature(),
            )
            .await?;

        state.record("INTAKE", summary.trim());
        state.priority = priority_for(state.customer_query());

        info!(ticket_id = %state.ticket_id(), priority = %state.priority, "intake complete");
        Ok(state)
    }
}
