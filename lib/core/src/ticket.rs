//! The ticket record threaded through every workflow stage.
//!
//! A [`TicketState`] is created once per incoming request and handed from
//! stage to stage by value. Each stage owns a fixed set of fields:
//!
//! | stage | fields written |
//! |---|---|
//! | intake | `priority` |
//! | faq lookup | `faq_match` |
//! | classifier | `category` |
//! | technical / billing / general | `resolution` |
//! | escalation check | `needs_escalation` |
//! | escalation response / response | `final_response` |
//!
//! Every stage also appends to the conversation history through
//! [`TicketState::record`]. The history cannot be reordered or truncated,
//! and the ticket id and customer query cannot be changed after creation.

use crate::error::TicketError;
use crate::id::TicketId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt;

/// Support ticket category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Software bugs, errors, crashes, performance problems.
    Technical,
    /// Payments, invoices, subscriptions, refunds.
    Billing,
    /// Account questions, how-to queries, product information.
    General,
    /// Explicitly unclassifiable.
    Unknown,
}

impl Category {
    /// All categories in declaration order.
    pub const ALL: [Category; 4] = [
        Category::Technical,
        Category::Billing,
        Category::General,
        Category::Unknown,
    ];

    /// Returns the upper-case label for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "TECHNICAL",
            Self::Billing => "BILLING",
            Self::General => "GENERAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Parses an exact (trimmed, case-insensitive) category label.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let label = raw.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == label)
    }

    /// Normalizes free-form classifier output into a category.
    ///
    /// Anything that is not exactly one of the category labels becomes
    /// [`Category::General`].
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self::parse(raw).unwrap_or(Self::General)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Returns the lower-case label for this priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The mutable record flowing through the support workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketState {
    ticket_id: TicketId,
    customer_query: String,
    /// Ticket category; `None` until the classifier runs.
    pub category: Option<Category>,
    /// Knowledge-base answer matching the query, if any.
    pub faq_match: Option<String>,
    /// Proposed resolution from the specialized stage.
    pub resolution: Option<String>,
    /// Whether the ticket must be handed to a human.
    pub needs_escalation: bool,
    /// Customer-facing reply; set by a terminal stage.
    pub final_response: Option<String>,
    conversation_history: Vec<String>,
    /// Ticket priority.
    pub priority: Priority,
    /// Pass-through customer contact.
    pub customer_email: Option<String>,
    /// Pass-through creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Pass-through caller metadata.
    pub metadata: Map<String, JsonValue>,
}

impl TicketState {
    /// Creates a new ticket with every mutable field at its default.
    #[must_use]
    pub fn new(ticket_id: TicketId, customer_query: impl Into<String>) -> Self {
        Self {
            ticket_id,
            customer_query: customer_query.into(),
            category: None,
            faq_match: None,
            resolution: None,
            needs_escalation: false,
            final_response: None,
            conversation_history: Vec::new(),
            priority: Priority::default(),
            customer_email: None,
            timestamp: Utc::now(),
            metadata: Map::new(),
        }
    }

    /// Creates a new ticket, rejecting an empty customer query.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::EmptyQuery`] if the query is blank.
    pub fn try_new(
        ticket_id: TicketId,
        customer_query: impl Into<String>,
    ) -> Result<Self, TicketError> {
        let customer_query = customer_query.into();
        if customer_query.trim().is_empty() {
            return Err(TicketError::EmptyQuery);
        }
        Ok(Self::new(ticket_id, customer_query))
    }

    /// Sets the customer email.
    #[must_use]
    pub fn with_customer_email(mut self, email: impl Into<String>) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, JsonValue>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the ticket id.
    #[must_use]
    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    /// Returns the original customer query.
    #[must_use]
    pub fn customer_query(&self) -> &str {
        &self.customer_query
    }

    /// Returns the audit trail in the order entries were recorded.
    #[must_use]
    pub fn conversation_history(&self) -> &[String] {
        &self.conversation_history
    }

    /// Returns at most the last `limit` history entries, for display.
    #[must_use]
    pub fn recent_history(&self, limit: usize) -> &[String] {
        let start = self.conversation_history.len().saturating_sub(limit);
        &self.conversation_history[start..]
    }

    /// Appends a tagged audit entry of the form `[TAG] message`.
    pub fn record(&mut self, tag: &str, message: impl AsRef<str>) {
        self.conversation_history
            .push(format!("[{tag}] {}", message.as_ref()));
    }

    /// Returns the category label, or an empty string when unclassified.
    #[must_use]
    pub fn category_label(&self) -> &'static str {
        self.category.map_or("", |c| c.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(query: &str) -> TicketState {
        TicketState::new("TKT-TEST0001".parse().expect("id"), query)
    }

    #[test]
    fn new_ticket_has_defaults() {
        let state = ticket("My app crashes");
        assert_eq!(state.ticket_id().as_str(), "TKT-TEST0001");
        assert_eq!(state.customer_query(), "My app crashes");
        assert_eq!(state.category, None);
        assert_eq!(state.faq_match, None);
        assert_eq!(state.resolution, None);
        assert!(!state.needs_escalation);
        assert_eq!(state.final_response, None);
        assert!(state.conversation_history().is_empty());
        assert_eq!(state.priority, Priority::Medium);
        assert_eq!(state.category_label(), "");
    }

    #[test]
    fn try_new_rejects_blank_query() {
        let id: TicketId = "TKT-1".parse().expect("id");
        assert_eq!(
            TicketState::try_new(id, "  \n").unwrap_err(),
            TicketError::EmptyQuery
        );
    }

    #[test]
    fn record_appends_tagged_entries_in_order() {
        let mut state = ticket("hello");
        state.record("INTAKE", "summary");
        state.record("FAQ", "No direct match found");
        assert_eq!(
            state.conversation_history(),
            ["[INTAKE] summary", "[FAQ] No direct match found"]
        );
    }

    #[test]
    fn recent_history_limits_from_the_end() {
        let mut state = ticket("hello");
        for i in 0..5 {
            state.record("STEP", i.to_string());
        }
        assert_eq!(state.recent_history(2), ["[STEP] 3", "[STEP] 4"]);
        assert_eq!(state.recent_history(10).len(), 5);
        assert_eq!(state.conversation_history().len(), 5);
    }

    #[test]
    fn normalize_accepts_exact_labels() {
        assert_eq!(Category::normalize(" technical \n"), Category::Technical);
        assert_eq!(Category::normalize("Billing"), Category::Billing);
        assert_eq!(Category::normalize("UNKNOWN"), Category::Unknown);
    }

    #[test]
    fn normalize_falls_back_to_general() {
        assert_eq!(Category::normalize("weird_value"), Category::General);
        assert_eq!(Category::normalize("TECHNICAL ISSUE"), Category::General);
        assert_eq!(Category::normalize(""), Category::General);
    }

    #[test]
    fn serde_uses_wire_casing() {
        let mut state = ticket("refund please");
        state.category = Some(Category::Billing);
        state.priority = Priority::High;

        let json = serde_json::to_value(&state).expect("serialize");
        assert_eq!(json["category"], "BILLING");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["ticket_id"], "TKT-TEST0001");

        let parsed: TicketState = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, state);
    }
}
