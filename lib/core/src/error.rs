//! Error handling foundation for the triage workspace.
//!
//! Each crate defines its own domain-specific error types in its own error
//! module and propagates them through rootcause reports, adding
//! layer-appropriate context with `.context()` on the way up.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C> = std::result::Result<T, Report<C>>;

/// Errors raised while constructing a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketError {
    /// The customer query was empty or whitespace only.
    EmptyQuery,
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "customer query must not be empty"),
        }
    }
}

impl std::error::Error for TicketError {}
