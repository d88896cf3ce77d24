//! Error types for the HTTP service.
//!
//! [`StartupError`] covers everything that can stop the server from coming
//! up; [`ApiError`] is what handlers return, rendered as a JSON body that
//! never leaks more than the failing stage and its message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use triage_core::TicketError;

/// Failures while assembling the application state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    /// Configuration could not be loaded or failed validation.
    Config,
    /// The FAQ knowledge base could not be loaded.
    KnowledgeBase,
    /// The text-generation backend could not be created.
    Backend,
    /// The support workflow failed to compile.
    Workflow,
    /// The listener could not be bound or the server stopped with an error.
    Serve,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "failed to load configuration"),
            Self::KnowledgeBase => write!(f, "failed to load FAQ knowledge base"),
            Self::Backend => write!(f, "failed to create text-generation backend"),
            Self::Workflow => write!(f, "failed to compile support workflow"),
            Self::Serve => write!(f, "server error"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Request failures surfaced to API clients.
#[derive(Debug)]
pub enum ApiError {
    /// The customer query was blank.
    EmptyQuery,
    /// The caller-supplied ticket id was rejected.
    InvalidTicketId { reason: String },
    /// The workflow run failed.
    Processing { detail: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyQuery => write!(f, "customer_query must not be empty"),
            Self::InvalidTicketId { reason } => write!(f, "invalid ticket_id: {reason}"),
            Self::Processing { detail } => write!(f, "error processing ticket: {detail}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<TicketError> for ApiError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::EmptyQuery => Self::EmptyQuery,
        }
    }
}

/// JSON body returned for every [`ApiError`].
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, detail) = match self {
            Self::EmptyQuery => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid ticket request",
                "customer_query must not be empty".to_string(),
            ),
            Self::InvalidTicketId { reason } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid ticket request",
                reason,
            ),
            Self::Processing { detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error processing ticket",
                detail,
            ),
        };

        (status, Json(ErrorBody { error, detail })).into_response()
    }
}
