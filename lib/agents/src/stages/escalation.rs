use super::{StageDeps, truncate_chars, vars};
use crate::prompts;
use async_trait::async_trait;
use tracing::info;
use triage_core::TicketState;
use triage_workflow::{Stage, StageResult};

/// Keywords that escalate a ticket without consulting the backend.
pub const DEFAULT_ESCALATION_KEYWORDS: [&str; 10] = [
    "lawsuit",
    "lawyer",
    "attorney",
    "sue",
    "legal action",
    "urgent",
    "critical",
    "angry",
    "frustrated",
    "unacceptable",
];

const ESCALATION_TEMPERATURE: f32 = 0.2;
const RESOLUTION_PROMPT_CHARS: usize = 500;

/// Decides whether a human must take over.
///
/// Owns `needs_escalation`. A keyword hit in the customer's message
/// escalates immediately and skips the backend; otherwise the backend is
/// asked and only an `ESCALATE` verdict escalates.
#[derive(Debug, Clone)]
pub struct EscalationCheckStage {
    deps: StageDeps,
}

impl EscalationCheckStage {
    #[must_use]
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }

    fn keyword_hit(&self, query: &str) -> Option<&str> {
        let query = query.to_lowercase();
        self.deps
            .escalation_keywords
            .iter()
            .find(|keyword| query.contains(keyword.as_str()))
            .map(String::as_str)
    }
}

#[async_trait]
impl Stage<TicketState> for EscalationCheckStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(ticket_id = %state.ticket_id(), "evaluating escalation");

        if let Some(keyword) = self.keyword_hit(state.customer_query()) {
            info!(ticket_id = %state.ticket_id(), keyword, "auto-escalated on keyword");
            state.needs_escalation = true;
            state.record("ESCALATION", "Auto-escalated based on keywords");
            return Ok(state);
        }

        let category = match state.category_label() {
            "" => "UNKNOWN",
            label => label,
        };
        let resolution = state.resolution.as_deref().unwrap_or_default();
        let verdict = self
            .deps
            .generate(
                prompts::ESCALATION_DECISION,
                &vars([
                    ("query", state.customer_query()),
                    ("category", category),
                    ("priority", state.priority.as_str()),
                    ("resolution", truncate_chars(resolution, RESOLUTION_PROMPT_CHARS)),
                ]),
                ESCALATION_TEMPERATURE,
            )
            .await?;

        if verdict.trim().eq_ignore_ascii_case(prompts::ESCALATE) {
            state.needs_escalation = true;
            state.record("ESCALATION", "Marked for human review");
            info!(ticket_id = %state.ticket_id(), "marked for escalation");
        } else {
            state.needs_escalation = false;
            state.record("ESCALATION", "Cleared for automated response");
            info!(ticket_id = %state.ticket_id(), "cleared for automated response");
        }
        Ok(state)
    }
}
