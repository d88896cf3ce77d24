use super::{StageDeps, vars};
use crate::prompts;
use async_trait::async_trait;
use tracing::{info, warn};
use triage_core::{Category, TicketState};
use triage_workflow::{Stage, StageResult};

const CLASSIFIER_TEMPERATURE: f32 = 0.1;

/// Assigns the ticket a category.
///
/// Owns `category`. Backend output is normalized here, at the one place it
/// enters the state; anything that is not a known category becomes
/// [`Category::General`].
#[derive(Debug, Clone)]
pub struct ClassifierStage {
    deps: StageDeps,
}

impl ClassifierStage {
    #[must_use]
    pub fn new(deps: StageDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Stage<TicketState> for ClassifierStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(ticket_id = %state.ticket_id(), "classifying ticket");

        let reply = self
            .deps
            .generate(
                prompts::CLASSIFY,
                &vars([
                    ("query", state.customer_query()),
                    ("faq_match", state.faq_match.as_deref().unwrap_or_default()),
                ]),
                CLASSIFIER_TEMPERATURE,
            )
            .await?;

        if Category::parse(&reply).is_none() {
            warn!(
                ticket_id = %state.ticket_id(),
                raw = reply.trim(),
                "invalid category, defaulting to GENERAL"
            );
        }
        let category = Category::normalize(&reply);

        state.category = Some(category);
        state.record("CLASSIFIER", format!("Category: {category}"));

        info!(ticket_id = %state.ticket_id(), category = %category, "ticket classified");
        Ok(state)
    }
}
