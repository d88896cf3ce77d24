//! Assembly of the support ticket workflow.
//!
//! ```text
//! intake -> faq_lookup -> classifier -> technical_support ┐
//!                                    -> billing_support   ├-> escalation_check -> escalation_response -> END
//!                                    -> general_support   ┘                    -> response_gen        -> END
//! ```

use crate::stages::{
    ClassifierStage, EscalationCheckStage, EscalationResponseStage, FaqLookupStage, IntakeStage,
    ResponseStage, SpecialistStage, Specialty, StageDeps,
};
use tracing::info;
use triage_core::TicketState;
use triage_workflow::{CategoryRouter, CompiledGraph, END, EscalationRouter, GraphError, StateGraph};

/// Stage names used in the support workflow.
pub mod stage_names {
    pub const INTAKE: &str = "intake";
    pub const FAQ_LOOKUP: &str = "faq_lookup";
    pub const CLASSIFIER: &str = "classifier";
    pub const TECHNICAL_SUPPORT: &str = "technical_support";
    pub const BILLING_SUPPORT: &str = "billing_support";
    pub const GENERAL_SUPPORT: &str = "general_support";
    pub const ESCALATION_CHECK: &str = "escalation_check";
    pub const ESCALATION_RESPONSE: &str = "escalation_response";
    pub const RESPONSE_GEN: &str = "response_gen";
}

use stage_names::*;

/// Builds and compiles the support workflow.
///
/// # Errors
///
/// Returns a [`GraphError`] if the graph is malformed, which only happens
/// if the wiring below is broken.
pub fn support_workflow(deps: StageDeps) -> Result<CompiledGraph<TicketState>, GraphError> {
    let mut graph = StateGraph::new();
    graph
        .add_stage(INTAKE, IntakeStage::new(deps.clone()))?
        .add_stage(FAQ_LOOKUP, FaqLookupStage::new(deps.clone()))?
        .add_stage(CLASSIFIER, ClassifierStage::new(deps.clone()))?
        .add_stage(
            TECHNICAL_SUPPORT,
            SpecialistStage::new(deps.clone(), Specialty::Technical),
        )?
        .add_stage(
            BILLING_SUPPORT,
            SpecialistStage::new(deps.clone(), Specialty::Billing),
        )?
        .add_stage(
            GENERAL_SUPPORT,
            SpecialistStage::new(deps.clone(), Specialty::General),
        )?
        .add_stage(ESCALATION_CHECK, EscalationCheckStage::new(deps.clone()))?
        .add_stage(
            ESCALATION_RESPONSE,
            EscalationResponseStage::new(deps.clone()),
        )?
        .add_stage(RESPONSE_GEN, ResponseStage::new(deps))?;

    graph
        .set_entry(INTAKE)?
        .add_edge(INTAKE, FAQ_LOOKUP)?
        .add_edge(FAQ_LOOKUP, CLASSIFIER)?
        .add_conditional_edge(
            CLASSIFIER,
            CategoryRouter,
            [
                (CategoryRouter::TECHNICAL, TECHNICAL_SUPPORT),
                (CategoryRouter::BILLING, BILLING_SUPPORT),
                (CategoryRouter::GENERAL, GENERAL_SUPPORT),
            ],
        )?
        .add_edge(TECHNICAL_SUPPORT, ESCALATION_CHECK)?
        .add_edge(BILLING_SUPPORT, ESCALATION_CHECK)?
        .add_edge(GENERAL_SUPPORT, ESCALATION_CHECK)?
        .add_conditional_edge(
            ESCALATION_CHECK,
            EscalationRouter,
            [
                (EscalationRouter::ESCALATED, ESCALATION_RESPONSE),
                (EscalationRouter::AUTOMATED, RESPONSE_GEN),
            ],
        )?
        .add_edge(ESCALATION_RESPONSE, END)?
        .add_edge(RESPONSE_GEN, END)?;

    let compiled = graph.compile()?;
    info!(
        stages = compiled.stage_names().count(),
        entry = compiled.entry(),
        "support workflow compiled"
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::knowledge_base::FaqDatabase;
    use crate::test_support::{deps_with, sample_faqs, ticket};
    use std::sync::Arc;
    use std::time::Duration;
    use triage_ai::{LlmError, ScriptedBackend};
    use triage_core::{Category, Priority};
    use triage_workflow::ExecutionError;

    fn billing_backend(verdict: &str) -> ScriptedBackend {
        ScriptedBackend::new("generated text")
            .reply_when("intake specialist", "Customer reports a duplicate charge.")
            .reply_when("FAQ matching specialist", "NO_MATCH")
            .reply_when("ticket classifier", "BILLING")
            .reply_when("billing and payment", "We will refund the charge.")
            .reply_when("escalation evaluation", verdict)
            .reply_when("escalation notifications", "Escalation notice")
            .reply_when("response writer", "Final reply")
    }

    #[tokio::test]
    async fn automated_billing_run() {
        let (mut deps, backend) = deps_with(billing_backend("RESOLVE"));
        deps.faqs = Arc::new(sample_faqs());
        let workflow = support_workflow(deps).expect("workflow");

        let outcome = workflow
            .invoke_traced(ticket("I was charged twice this month"))
            .await
            .expect("run");

        assert_eq!(
            outcome.visited,
            [
                INTAKE,
                FAQ_LOOKUP,
                CLASSIFIER,
                BILLING_SUPPORT,
                ESCALATION_CHECK,
                RESPONSE_GEN
            ]
        );
        let state = outcome.state;
        assert_eq!(state.category, Some(Category::Billing));
        assert_eq!(state.priority, Priority::Medium);
        assert_eq!(state.faq_match, None);
        assert_eq!(
            state.resolution.as_deref(),
            Some("We will refund the charge.")
        );
        assert!(!state.needs_escalation);
        assert_eq!(state.final_response.as_deref(), Some("Final reply"));
        assert_eq!(
            state.conversation_history(),
            [
                "[INTAKE] Customer reports a duplicate charge.",
                "[FAQ] No direct match found",
                "[CLASSIFIER] Category: BILLING",
                "[BILLING] Resolution provided",
                "[ESCALATION] Cleared for automated response",
                "[RESPONSE] Final response generated",
            ]
        );
        assert_eq!(backend.call_count(), 6);
    }

    #[tokio::test]
    async fn escalated_run_ends_with_notice() {
        let (deps, _) = deps_with(billing_backend("ESCALATE"));
        let workflow = support_workflow(deps).expect("workflow");

        let outcome = workflow
            .invoke_traced(ticket("Please refund my annual plan"))
            .await
            .expect("run");

        assert_eq!(
            outcome.visited.last().map(String::as_str),
            Some(ESCALATION_RESPONSE)
        );
        assert!(outcome.state.needs_escalation);
        assert_eq!(
            outcome.state.final_response.as_deref(),
            Some("Escalation notice")
        );
        assert_eq!(
            outcome.state.conversation_history().len(),
            outcome.visited.len()
        );
    }

    #[tokio::test]
    async fn unrecognized_category_takes_general_branch() {
        let backend = ScriptedBackend::new("generated text")
            .reply_when("ticket classifier", "not sure, maybe sales")
            .reply_when("escalation evaluation", "RESOLVE");
        let (deps, _) = deps_with(backend);
        let workflow = support_workflow(deps).expect("workflow");

        let outcome = workflow
            .invoke_traced(ticket("Do you have a mobile app?"))
            .await
            .expect("run");

        assert!(outcome.visited.iter().any(|s| s == GENERAL_SUPPORT));
        assert_eq!(outcome.state.category, Some(Category::General));
    }

    #[tokio::test]
    async fn backend_timeout_fails_the_run_at_first_stage() {
        let backend = ScriptedBackend::new("slow").with_delay(Duration::from_millis(500));
        let generator = Generator::new(Arc::new(backend), Duration::from_millis(20));
        let deps = StageDeps::new(generator, Arc::new(FaqDatabase::default()));
        let workflow = support_workflow(deps).expect("workflow");

        let report = workflow
            .invoke(ticket("Hello"))
            .await
            .unwrap_err();

        assert_eq!(
            report.current_context(),
            &ExecutionError::StageFailed {
                stage: INTAKE.to_string()
            }
        );
    }

    #[tokio::test]
    async fn backend_error_names_failing_stage() {
        let backend = ScriptedBackend::new("ok")
            .reply_when("FAQ matching specialist", "NO_MATCH")
            .fail_when(
                "ticket classifier",
                LlmError::RateLimited {
                    retry_after_secs: Some(1),
                },
            );
        let (mut deps, backend) = deps_with(backend);
        deps.faqs = Arc::new(sample_faqs());
        let workflow = support_workflow(deps).expect("workflow");

        let report = workflow.invoke(ticket("Hello")).await.unwrap_err();

        assert_eq!(
            report.current_context(),
            &ExecutionError::StageFailed {
                stage: CLASSIFIER.to_string()
            }
        );
        assert_eq!(backend.call_count(), 3, "no retry after the failure");
    }

    #[tokio::test]
    async fn concurrent_runs_share_one_workflow() {
        let (deps, _) = deps_with(billing_backend("RESOLVE"));
        let workflow = Arc::new(support_workflow(deps).expect("workflow"));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let workflow = Arc::clone(&workflow);
                tokio::spawn(async move {
                    let state = triage_core::TicketState::new(
                        format!("TKT-CONC{i:04}").parse().expect("id"),
                        "I was charged twice",
                    );
                    workflow.invoke(state).await
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let state = handle.await.expect("join").expect("run");
            assert_eq!(state.ticket_id().as_str(), format!("TKT-CONC{i:04}"));
            assert_eq!(state.conversation_history().len(), 6);
        }
    }
}
