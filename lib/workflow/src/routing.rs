//! Routers for the support ticket workflow.

use crate::router::{BranchKey, Router};
use tracing::debug;
use triage_core::TicketState;

/// Routes a classified ticket to the matching specialist stage.
///
/// Matching is a substring test on the upper-cased, trimmed category label:
/// `TECHNICAL` wins over `BILLING`, and everything else, including an
/// unset category, goes to the general branch. The router never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryRouter;

impl CategoryRouter {
    pub const TECHNICAL: BranchKey = BranchKey::from_static("technical_support");
    pub const BILLING: BranchKey = BranchKey::from_static("billing_support");
    pub const GENERAL: BranchKey = BranchKey::from_static("general_support");

    /// Chooses a branch from a raw category label.
    #[must_use]
    pub fn branch_for(label: &str) -> BranchKey {
        let label = label.trim().to_uppercase();
        if label.contains("TECHNICAL") {
            Self::TECHNICAL
        } else if label.contains("BILLING") {
            Self::BILLING
        } else {
            Self::GENERAL
        }
    }
}

impl Router<TicketState> for CategoryRouter {
    fn route(&self, state: &TicketState) -> BranchKey {
        let branch = Self::branch_for(state.category_label());
        debug!(
            ticket_id = %state.ticket_id(),
            category = state.category_label(),
            branch = %branch,
            "routing by category"
        );
        branch
    }

    fn branches(&self) -> Vec<BranchKey> {
        vec![Self::TECHNICAL, Self::BILLING, Self::GENERAL]
    }
}

/// Chooses between the escalation notice and the automated reply.
///
/// Only `needs_escalation` is inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscalationRouter;

impl EscalationRouter {
    pub const ESCALATED: BranchKey = BranchKey::from_static("end_escalated");
    pub const AUTOMATED: BranchKey = BranchKey::from_static("send_response");
}

impl Router<TicketState> for EscalationRouter {
    fn route(&self, state: &TicketState) -> BranchKey {
        if state.needs_escalation {
            debug!(ticket_id = %state.ticket_id(), "escalated to human agent");
            Self::ESCALATED
        } else {
            debug!(ticket_id = %state.ticket_id(), "proceeding to automated response");
            Self::AUTOMATED
        }
    }

    fn branches(&self) -> Vec<BranchKey> {
        vec![Self::ESCALATED, Self::AUTOMATED]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Category, Priority};

    fn ticket() -> TicketState {
        TicketState::new("TKT-ROUTE001".parse().expect("id"), "help")
    }

    #[test]
    fn category_branch_uses_substring_priority() {
        assert_eq!(
            CategoryRouter::branch_for("technical issue"),
            CategoryRouter::TECHNICAL
        );
        assert_eq!(
            CategoryRouter::branch_for("BILLING NOTES"),
            CategoryRouter::BILLING
        );
        assert_eq!(
            CategoryRouter::branch_for("weird_value"),
            CategoryRouter::GENERAL
        );
        assert_eq!(
            CategoryRouter::branch_for("  billing or technical  "),
            CategoryRouter::TECHNICAL
        );
        assert_eq!(CategoryRouter::branch_for(""), CategoryRouter::GENERAL);
    }

    #[test]
    fn category_router_reads_state_category() {
        let mut state = ticket();
        assert_eq!(CategoryRouter.route(&state), CategoryRouter::GENERAL);

        state.category = Some(Category::Technical);
        assert_eq!(CategoryRouter.route(&state), CategoryRouter::TECHNICAL);

        state.category = Some(Category::Billing);
        assert_eq!(CategoryRouter.route(&state), CategoryRouter::BILLING);

        state.category = Some(Category::Unknown);
        assert_eq!(CategoryRouter.route(&state), CategoryRouter::GENERAL);
    }

    #[test]
    fn escalation_router_only_reads_flag() {
        let mut state = ticket();
        state.category = Some(Category::Billing);
        state.priority = Priority::High;
        state.resolution = Some("refund issued".to_string());
        assert_eq!(EscalationRouter.route(&state), EscalationRouter::AUTOMATED);

        state.needs_escalation = true;
        assert_eq!(EscalationRouter.route(&state), EscalationRouter::ESCALATED);

        state.priority = Priority::Low;
        state.category = None;
        assert_eq!(EscalationRouter.route(&state), EscalationRouter::ESCALATED);
    }

    #[test]
    fn routers_declare_all_keys() {
        assert_eq!(CategoryRouter.branches().len(), 3);
        assert_eq!(
            EscalationRouter.branches(),
            vec![EscalationRouter::ESCALATED, EscalationRouter::AUTOMATED]
        );
    }
}
