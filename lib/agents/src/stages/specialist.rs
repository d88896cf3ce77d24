use super::{StageDeps, vars};
use crate::prompts;
use async_trait::async_trait;
use tracing::info;
use triage_core::TicketState;
use triage_workflow::{Stage, StageResult};

/// The specialist teams a ticket can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Specialty {
    Technical,
    Billing,
    General,
}

impl Specialty {
    fn template(self) -> &'static str {
        match self {
            Self::Technical => prompts::TECHNICAL_RESOLUTION,
            Self::Billing => prompts::BILLING_RESOLUTION,
            Self::General => prompts::GENERAL_RESOLUTION,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::Billing => "BILLING",
            Self::General => "GENERAL",
        }
    }
}

/// Drafts a resolution for one category of ticket.
///
/// Owns `resolution`.
#[derive(Debug, Clone)]
pub struct SpecialistStage {
    deps: StageDeps,
    specialty: Specialty,
}

impl SpecialistStage {
    #[must_use]
    pub fn new(deps: StageDeps, specialty: Specialty) -> Self {
        Self { deps, specialty }
    }
}

#[async_trait]
impl Stage<TicketState> for SpecialistStage {
    async fn run(&self, mut state: TicketState) -> StageResult<TicketState> {
        info!(
            ticket_id = %state.ticket_id(),
            specialty = ?self.specialty,
            "drafting resolution"
        );

        let resolution = self
            .deps
            .generate(
                self.specialty.template(),
                &vars([
                    ("query", state.customer_query()),
                    ("priority", state.priority.as_str()),
                    ("faq_match", state.faq_match.as_deref().unwrap_or("None")),
                ]),
                self.deps.generator.default_temperature(),
            )
            .await?;

        state.resolution = Some(resolution);
        state.record(self.specialty.tag(), "Resolution provided");
        Ok(state)
    }
}
