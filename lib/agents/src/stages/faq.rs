use super::{StageDeps, truncate_chars, vars};
use crate::prompts;
use async_trait::async_trait;
use tracing::info;
use triage_core::TicketState;
use triage_workflow::{Stage, StageResult};

const FAQ_TEMPERATURE: f32 = 0.3;
const MATCH_PREVIEW_CHARS: usize = 100;

/// Looks for an FAQ answer that resolves the ticket outright.
///
/// Owns `faq_match`. With an empty knowledge base no backend call is made
/// and the ticket simply has no match.
#[derive(Debug, Clone)]
pub struct FaqLookupStage {
    deps: StageDeps,
}

impl FaqLookupStage {
    #[must_use]
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Stage<TicketState> for FaqLookupStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(ticket_id = %state.ticket_id(), "searching FAQ");

        if self.deps.faqs.is_empty() {
            state.faq_match = None;
            state.record("FAQ", "No FAQ entries available");
            return Ok(state);
        }

        let listing = self.deps.faqs.prompt_listing();
        let reply = self
            .deps
            .generate(
                prompts::FAQ_MATCH,
                &vars([
                    ("query", state.customer_query()),
                    ("faq_list", listing.as_str()),
                ]),
                FAQ_TEMPERATURE,
            )
            .await?;
        let reply = reply.trim();

        if reply.is_empty() || reply == prompts::NO_MATCH {
            state.faq_match = None;
            state.record("FAQ", "No direct match found");
            info!(ticket_id = %state.ticket_id(), "no FAQ match found");
        } else {
            state.record(
                "FAQ",
                format!(
                    "Match found: {}...",
                    truncate_chars(reply, MATCH_PREVIEW_CHARS)
                ),
            );
            state.faq_match = Some(reply.to_string());
            info!(ticket_id = %state.ticket_id(), "FAQ match found");
        }
        Ok(state)
    }
}
