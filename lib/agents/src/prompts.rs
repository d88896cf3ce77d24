//! Prompt catalogue for the support stages.
//!
//! Each stage renders exactly one template. Variables are filled from the
//! ticket state; see the stage modules for which fields feed which prompt.

use triage_ai::{PromptRegistry, PromptTemplate, VariableDefinition};

pub const INTAKE_SUMMARY: &str = "intake_summary";
pub const FAQ_MATCH: &str = "faq_match";
pub const CLASSIFY: &str = "classify_ticket";
pub const TECHNICAL_RESOLUTION: &str = "technical_resolution";
pub const BILLING_RESOLUTION: &str = "billing_resolution";
pub const GENERAL_RESOLUTION: &str = "general_resolution";
pub const ESCALATION_DECISION: &str = "escalation_decision";
pub const ESCALATION_NOTICE: &str = "escalation_notice";
pub const FINAL_RESPONSE: &str = "final_response";

/// Reply from the FAQ matcher meaning no entry applies.
pub const NO_MATCH: &str = "NO_MATCH";

/// Reply from the escalation judge meaning a human must take over.
pub const ESCALATE: &str = "ESCALATE";

fn query_var() -> VariableDefinition {
    VariableDefinition::required("The customer's original message")
}

fn specialist(name: &str, system: &str, closing: &str) -> PromptTemplate {
    PromptTemplate::new(
        name,
        format!(
            "Customer Query: {{{{query}}}}\n\nPriority: {{{{priority}}}}\n\n\
             FAQ Match: {{{{faq_match}}}}\n\n{closing}"
        ),
    )
    .with_system_prompt(system)
    .with_variable("query", query_var())
    .with_variable(
        "priority",
        VariableDefinition::optional("Ticket priority").with_default("medium".into()),
    )
    .with_variable(
        "faq_match",
        VariableDefinition::optional("Matched FAQ answer").with_default("None".into()),
    )
}

/// Builds the registry holding every stage prompt.
#[must_use]
pub fn catalogue() -> PromptRegistry {
    let mut registry = PromptRegistry::new();

    registry.register(
        PromptTemplate::new(INTAKE_SUMMARY, "Customer Query: {{query}}")
            .with_description("Summarize an incoming ticket")
            .with_system_prompt(
                "You are a customer support intake specialist. Summarize the \
                 customer's message, noting:\n\
                 1. The main issue or question\n\
                 2. Any product or service mentioned\n\
                 3. How urgent it seems (low, medium, high)\n\
                 4. The customer's sentiment (positive, neutral, negative)\n\n\
                 Keep the summary short.",
            )
            .with_variable("query", query_var()),
    );

    registry.register(
        PromptTemplate::new(
            FAQ_MATCH,
            "Customer Query: {{query}}\n\nAvailable FAQs:\n{{faq_list}}\n\nYour response:",
        )
        .with_description("Find an FAQ entry that answers the query")
        .with_system_prompt(
            "You are a FAQ matching specialist. Decide whether one of the FAQ \
             entries directly answers the customer's question. If one does, \
             reply with ONLY that entry's answer. If none does, reply with \
             exactly NO_MATCH. Only report a match when it clearly applies.",
        )
        .with_variable("query", query_var())
        .with_variable(
            "faq_list",
            VariableDefinition::required("Formatted FAQ entries"),
        ),
    );

    registry.register(
        PromptTemplate::new(
            CLASSIFY,
            "Customer Query: {{query}}\n\nFAQ Match (if any): {{faq_match}}\n\nClassification:",
        )
        .with_description("Assign the ticket a category")
        .with_system_prompt(
            "You are a support ticket classifier. Put the query in EXACTLY ONE \
             category:\n\
             TECHNICAL - bugs, errors, crashes, performance or other technical problems\n\
             BILLING - payments, invoices, subscriptions, pricing, refunds, charges\n\
             GENERAL - account questions, how-to questions, product information\n\n\
             Reply with only the category name: TECHNICAL, BILLING, or GENERAL.",
        )
        .with_variable("query", query_var())
        .with_variable(
            "faq_match",
            VariableDefinition::optional("Matched FAQ answer").with_default("".into()),
        ),
    );

    registry.register(specialist(
        TECHNICAL_RESOLUTION,
        "You are an expert technical support specialist. Work through the \
         problem systematically and give numbered troubleshooting steps, a \
         fix or workaround, and any preventive advice, in plain language. \
         Recommend escalation when the issue needs direct system access.\n\n\
         Structure: Problem Summary, Troubleshooting Steps, Expected Resolution, \
         Additional Notes.",
        "Provide technical support resolution:",
    ));

    registry.register(specialist(
        BILLING_RESOLUTION,
        "You are a billing and payment support specialist. Explain charges, \
         payment processes, refunds, credits, subscriptions and invoices \
         clearly and with empathy. Refund requests and disputes need approval, \
         so recommend escalation for them.\n\n\
         Structure: Issue Acknowledgment, Explanation or Solution, Next Steps, \
         Policy References.",
        "Provide billing support resolution:",
    ));

    registry.register(specialist(
        GENERAL_RESOLUTION,
        "You are a friendly general support specialist. Answer product and \
         account questions, give how-to guidance and point to helpful \
         resources.\n\n\
         Structure: Direct Answer, Step-by-Step Instructions, Additional \
         Resources, Follow-up Suggestions.",
        "Provide general support resolution:",
    ));

    registry.register(
        PromptTemplate::new(
            ESCALATION_DECISION,
            "Customer Query: {{query}}\n\nCategory: {{category}}\nPriority: {{priority}}\n\
             Proposed Resolution: {{resolution}}\n\nDecision:",
        )
        .with_description("Decide whether a human must take over")
        .with_system_prompt(
            "You are an escalation evaluation specialist.\n\n\
             ESCALATE when the ticket involves legal, compliance or policy \
             violations, refunds over $500, a frustrated, angry or threatening \
             customer, account-specific access or sensitive data, a critical \
             system bug, contract changes, or anything beyond automated help.\n\n\
             RESOLVE when it is a standard FAQ question, routine troubleshooting, \
             a simple billing inquiry, a how-to question, or has a documented fix.\n\n\
             Reply with one word: ESCALATE or RESOLVE.",
        )
        .with_variable("query", query_var())
        .with_variable(
            "category",
            VariableDefinition::optional("Ticket category").with_default("UNKNOWN".into()),
        )
        .with_variable(
            "priority",
            VariableDefinition::optional("Ticket priority").with_default("medium".into()),
        )
        .with_variable(
            "resolution",
            VariableDefinition::optional("Proposed resolution").with_default("".into()),
        ),
    );

    registry.register(
        PromptTemplate::new(
            ESCALATION_NOTICE,
            "Customer Query: {{query}}\n\nCategory: {{category}}\nPriority: {{priority}}\n\
             Ticket ID: {{ticket_id}}\nInternal Resolution Notes: {{resolution}}\n\n\
             Generate an empathetic escalation notification:",
        )
        .with_description("Tell the customer a specialist will follow up")
        .with_system_prompt(
            "You are a customer support specialist writing escalation \
             notifications. Write a warm, professional email telling the \
             customer their ticket is going to a human specialist. Acknowledge \
             their specific issue, present the hand-off positively, promise a \
             reply within 24 hours, quote the ticket ID and thank them for \
             their patience. Avoid jargon, template phrasing and overpromising.",
        )
        .with_variable("query", query_var())
        .with_variable(
            "ticket_id",
            VariableDefinition::required("Ticket identifier"),
        )
        .with_variable(
            "category",
            VariableDefinition::optional("Ticket category").with_default("GENERAL".into()),
        )
        .with_variable(
            "priority",
            VariableDefinition::optional("Ticket priority").with_default("medium".into()),
        )
        .with_variable(
            "resolution",
            VariableDefinition::optional("Internal notes")
                .with_default("Requires specialized review".into()),
        ),
    );

    registry.register(
        PromptTemplate::new(
            FINAL_RESPONSE,
            "Customer Query: {{query}}\n\nCategory: {{category}}\nTicket ID: {{ticket_id}}\n\
             Resolution: {{resolution}}\n\nGenerate final customer response:",
        )
        .with_description("Turn the resolution into a customer email")
        .with_system_prompt(
            "You are a professional customer support response writer. Turn the \
             resolution into a polished email: greet the customer, acknowledge \
             the issue, give the solution clearly (bullet points for steps), \
             offer further help, quote the ticket ID and sign off as the \
             support team. Keep it friendly and free of jargon.",
        )
        .with_variable("query", query_var())
        .with_variable(
            "ticket_id",
            VariableDefinition::required("Ticket identifier"),
        )
        .with_variable(
            "category",
            VariableDefinition::optional("Ticket category").with_default("GENERAL".into()),
        )
        .with_variable(
            "resolution",
            VariableDefinition::optional("Resolution text")
                .with_default("We're looking into this for you.".into()),
        ),
    );

    registry
}
