//! Error types for the AI crate.
//!
//! - `LlmError`: a single call to a text-generation backend failed
//! - `PromptError`: a template could not be found or filled

use std::fmt;
use std::time::Duration;

/// Errors from a text-generation backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The backend could not be reached at all.
    ProviderUnavailable { provider: String, reason: String },
    /// The backend answered with a non-success status.
    RequestFailed { status: u16, detail: String },
    /// The backend answered, but not with a usable completion.
    ResponseParseFailed { reason: String },
    /// No answer arrived within the allotted time.
    Timeout { after: Duration },
    /// The backend asked us to slow down.
    RateLimited { retry_after_secs: Option<u64> },
    /// The backend cannot be built from its configuration.
    InvalidConfig { reason: String },
}

impl LlmError {
    /// Whether repeating the same call later could succeed.
    ///
    /// Nothing in the workflow retries; callers use this for logging and
    /// for their own retry policy.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ProviderUnavailable { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => {
                true
            }
            Self::RequestFailed { status, .. } => *status >= 500,
            Self::ResponseParseFailed { .. } | Self::InvalidConfig { .. } => false,
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "cannot reach LLM provider '{provider}': {reason}")
            }
            Self::RequestFailed { status, detail } => {
                write!(f, "LLM request rejected with HTTP {status}: {detail}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "unusable LLM response: {reason}")
            }
            Self::Timeout { after } => {
                write!(f, "no LLM response within {} ms", after.as_millis())
            }
            Self::RateLimited {
                retry_after_secs: Some(secs),
            } => write!(f, "rate limited, retry after {secs}s"),
            Self::RateLimited {
                retry_after_secs: None,
            } => write!(f, "rate limited"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from prompt templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// No template is registered under this name.
    TemplateNotFound { name: String },
    /// Required variables were neither supplied nor defaulted.
    MissingVariables {
        template: String,
        variables: Vec<String>,
    },
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemplateNotFound { name } => write!(f, "no prompt template named '{name}'"),
            Self::MissingVariables {
                template,
                variables,
            } => write!(
                f,
                "template '{template}' is missing required variables: {}",
                variables.join(", ")
            ),
        }
    }
}

impl std::error::Error for PromptError {}
