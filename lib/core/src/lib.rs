//! Core domain types for the triage support-ticket pipeline.
//!
//! This crate provides the ticket record threaded through every workflow
//! stage, its identifier, and the shared error-handling alias.

pub mod error;
pub mod id;
pub mod ticket;

pub use error::{Result, TicketError};
pub use id::{DEFAULT_TICKET_PREFIX, ParseIdError, TicketId};
pub use ticket::{Category, Priority, TicketState};
