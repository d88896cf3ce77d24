//! Error types for the agents crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `StageError`: a stage could not obtain generated text
//! - `FaqError`: knowledge base file operations

use std::fmt;

/// Errors raised inside a stage transform.
///
/// The executor adds the stage name on top, so these only name the prompt
/// that was being used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The prompt template could not be rendered.
    Prompt { template: String },
    /// The text-generation call failed or timed out.
    Generation { template: String },
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prompt { template } => {
                write!(f, "failed to render prompt '{template}'")
            }
            Self::Generation { template } => {
                write!(f, "text generation failed for prompt '{template}'")
            }
        }
    }
}

impl std::error::Error for StageError {}

/// Errors from knowledge base file operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaqError {
    /// The file exists but could not be read.
    Read { path: String, reason: String },
    /// The file is not a valid FAQ document.
    Parse { path: String, reason: String },
    /// The file could not be written.
    Write { path: String, reason: String },
}

impl fmt::Display for FaqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, reason } => {
                write!(f, "failed to read FAQ database {path}: {reason}")
            }
            Self::Parse { path, reason } => {
                write!(f, "malformed FAQ database {path}: {reason}")
            }
            Self::Write { path, reason } => {
                write!(f, "failed to write FAQ database {path}: {reason}")
            }
        }
    }
}

impl std::error::Error for FaqError {}
