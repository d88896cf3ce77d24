use super::{StageDeps, vars};
use crate::prompts;
use async_trait::async_trait;
use tracing::info;
use triage_core::TicketState;
use triage_workflow::{Stage, StageResult};

const RESPONSE_TEMPERATURE: f32 = 0.7;

fn category_or_general(state: &TicketState) -> &'static str {
    match state.category_label() {
        "" => "GENERAL",
        label => label,
    }
}

/// Writes the customer notice for an escalated ticket. Owns `final_response`.
#[derive(Debug, Clone)]
pub struct EscalationResponseStage {
    deps: StageDeps,
}

impl EscalationResponseStage {
    #[must_use]
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Stage<TicketState> for EscalationResponseStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(ticket_id = %state.ticket_id(), "generating escalation response");

        let ticket_id = state.ticket_id().to_string();
        let notice = self
            .deps
            .generate(
                prompts::ESCALATION_NOTICE,
                &vars([
                    ("query", state.customer_query()),
                    ("category", category_or_general(&state)),
                    ("priority", state.priority.as_str()),
                    ("ticket_id", ticket_id.as_str()),
                    (
                        "resolution",
                        state
                            .resolution
                            .as_deref()
                            .unwrap_or("Requires specialized review"),
                    ),
                ]),
                RESPONSE_TEMPERATURE,
            )
            .await?;

        state.final_response = Some(notice);
        state.record("ESCALATION RESPONSE", "Customer notification generated");
        Ok(state)
    }
}

/// Turns the resolution into the customer reply. Owns `final_response`.
#[derive(Debug, Clone)]
pub struct ResponseStage {
    deps: StageDeps,
}

impl ResponseStage {
    #[must_use]
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Stage<TicketState> for ResponseStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(ticket_id = %state.ticket_id(), "generating final response");

        let ticket_id = state.ticket_id().to_string();
        let reply = self
            .deps
            .generate(
                prompts::FINAL_RESPONSE,
                &vars([
                    ("query", state.customer_query()),
                    ("category", category_or_general(&state)),
                    ("ticket_id", ticket_id.as_str()),
                    (
                        "resolution",
                        state
                            .resolution
                            .as_deref()
                            .unwrap_or("We're looking into this for you."),
                    ),
                ]),
                RESPONSE_TEMPERATURE,
            )
            .await?;

        state.final_response = Some(reply);
        state.record("RESPONSE", "Final response generated");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{deps_with, ticket};
    use triage_ai::ScriptedBackend;
    use triage_core::Category;

    #[tokio::test]
    async fn escalation_notice_quotes_ticket() {
        let (deps, backend) = deps_with(ScriptedBackend::new("A specialist will reach out."));
        let state = ticket("I want a refund for last year");

        let state = EscalationResponseStage::new(deps)
            .run(state)
            .await
            .expect("notice");

        assert_eq!(
            state.final_response.as_deref(),
            Some("A specialist will reach out.")
        );
        assert_eq!(
            state.conversation_history(),
            ["[ESCALATION RESPONSE] Customer notification generated"]
        );
        let request = &backend.requests()[0];
        assert!(request.prompt.contains("Ticket ID: TKT-TEST0001"));
        let notes = "Internal Resolution Notes: Requires specialized review";
        assert!(request.prompt.contains(notes));
        assert_eq!(request.temperature, Some(0.7));
    }

    #[tokio::test]
    async fn final_response_uses_resolution() {
        let (deps, backend) = deps_with(ScriptedBackend::new("Dear customer, ..."));
        let mut state = ticket("How do I export data?");
        state.category = Some(Category::General);
        state.resolution = Some("Use Settings > Export.".to_string());

        let state = ResponseStage::new(deps).run(state).await.expect("response");

        assert_eq!(state.final_response.as_deref(), Some("Dear customer, ..."));
        assert_eq!(
            state.conversation_history(),
            ["[RESPONSE] Final response generated"]
        );
        let prompt = &backend.requests()[0].prompt;
        assert!(prompt.contains("Resolution: Use Settings > Export."));
        assert!(prompt.contains("Category: GENERAL"));
    }
}
