//! Property: a stage only writes the fields it owns.
//!
//! Every stage runs against randomized tickets and randomized backend
//! replies; afterwards every field outside the stage's ownership must be
//! unchanged and the history must have grown by exactly one entry.

use super::*;
use crate::test_support::sample_faqs;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::time::Duration;
use triage_ai::ScriptedBackend;
use triage_core::{Category, Priority, TicketState};
use triage_workflow::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Category,
    FaqMatch,
    Resolution,
    NeedsEscalation,
    FinalResponse,
    Priority,
}

fn category() -> impl Strategy<Value = Option<Category>> {
    prop::option::of(prop::sample::select(Category::ALL.to_vec()))
}

fn priority() -> impl Strategy<Value = Priority> {
    prop::sample::select(vec![Priority::Low, Priority::Medium, Priority::High])
}

fn query() -> impl Strategy<Value = String> {
    let word = prop::sample::select(vec![
        "my", "invoice", "urgent", "app", "crashes", "refund", "question", "lawyer", "please",
        "password", "billing", "help",
    ]);
    prop::collection::vec(word, 1..8).prop_map(|words| words.join(" "))
}

fn reply() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("NO_MATCH".to_string()),
        Just("ESCALATE".to_string()),
        Just("TECHNICAL".to_string()),
        Just("billing".to_string()),
        "[a-zA-Z ]{0,40}",
    ]
}

prop_compose! {
    fn ticket_state()(
        query in query(),
        category in category(),
        priority in priority(),
        faq_match in prop::option::of("[a-z ]{1,20}"),
        resolution in prop::option::of("[a-z ]{1,600}"),
        needs_escalation in any::<bool>(),
        final_response in prop::option::of("[a-z ]{1,20}"),
        email in prop::option::of("[a-z]{1,8}@example\\.com"),
        history in prop::collection::vec("[a-z ]{0,12}", 0..4),
    ) -> TicketState {
        let mut state = TicketState::new("TKT-PROP0001".parse().expect("id"), query);
        state.category = category;
        state.priority = priority;
        state.faq_match = faq_match;
        state.resolution = resolution;
        state.needs_escalation = needs_escalation;
        state.final_response = final_response;
        if let Some(email) = email {
            state = state.with_customer_email(email);
        }
        for entry in history {
            state.record("PRIOR", entry);
        }
        state
    }
}

fn check_ownership(
    before: &TicketState,
    after: &TicketState,
    owned: &[Field],
) -> Result<(), TestCaseError> {
    prop_assert_eq!(before.ticket_id(), after.ticket_id());
    prop_assert_eq!(before.customer_query(), after.customer_query());
    prop_assert_eq!(&before.customer_email, &after.customer_email);
    prop_assert_eq!(before.timestamp, after.timestamp);
    prop_assert_eq!(&before.metadata, &after.metadata);

    let history = before.conversation_history();
    prop_assert_eq!(after.conversation_history().len(), history.len() + 1);
    prop_assert_eq!(&after.conversation_history()[..history.len()], history);

    if !owned.contains(&Field::Category) {
        prop_assert_eq!(before.category, after.category);
    }
    if !owned.contains(&Field::FaqMatch) {
        prop_assert_eq!(&before.faq_match, &after.faq_match);
    }
    if !owned.contains(&Field::Resolution) {
        prop_assert_eq!(&before.resolution, &after.resolution);
    }
    if !owned.contains(&Field::NeedsEscalation) {
        prop_assert_eq!(before.needs_escalation, after.needs_escalation);
    }
    if !owned.contains(&Field::FinalResponse) {
        prop_assert_eq!(&before.final_response, &after.final_response);
    }
    if !owned.contains(&Field::Priority) {
        prop_assert_eq!(before.priority, after.priority);
    }
    Ok(())
}

fn stages_under_test(deps: &StageDeps) -> Vec<(Box<dyn Stage<TicketState>>, Vec<Field>)> {
    vec![
        (
            Box::new(IntakeStage::new(deps.clone())),
            vec![Field::Priority],
        ),
        (
            Box::new(FaqLookupStage::new(deps.clone())),
            vec![Field::FaqMatch],
        ),
        (
            Box::new(ClassifierStage::new(deps.clone())),
            vec![Field::Category],
        ),
        (
            Box::new(SpecialistStage::new(deps.clone(), Specialty::Technical)),
            vec![Field::Resolution],
        ),
        (
            Box::new(SpecialistStage::new(deps.clone(), Specialty::Billing)),
            vec![Field::Resolution],
        ),
        (
            Box::new(SpecialistStage::new(deps.clone(), Specialty::General)),
            vec![Field::Resolution],
        ),
        (
            Box::new(EscalationCheckStage::new(deps.clone())),
            vec![Field::NeedsEscalation],
        ),
        (
            Box::new(EscalationResponseStage::new(deps.clone())),
            vec![Field::FinalResponse],
        ),
        (
            Box::new(ResponseStage::new(deps.clone())),
            vec![Field::FinalResponse],
        ),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn stages_only_write_owned_fields(
        state in ticket_state(),
        reply in reply(),
        with_faqs in any::<bool>(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");

        let generator = Generator::new(
            Arc::new(ScriptedBackend::new(reply)),
            Duration::from_secs(5),
        );
        let faqs = if with_faqs {
            sample_faqs()
        } else {
            FaqDatabase::default()
        };
        let deps = StageDeps::new(generator, Arc::new(faqs));

        for (stage, owned) in stages_under_test(&deps) {
            let after = runtime
                .block_on(stage.run(state.clone()))
                .expect("stage succeeds with a scripted backend");
            check_ownership(&state, &after, &owned)?;
        }
    }
}
