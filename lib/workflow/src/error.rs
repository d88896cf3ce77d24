//! Error types for the workflow crate.
//!
//! Errors are split by when they can occur:
//! - `GraphError`: Graph construction and compilation. Always raised before
//!   any ticket is processed.
//! - `ExecutionError`: Failures of a single run. These never affect the
//!   compiled graph or other runs; callers receive them wrapped in a
//!   rootcause `Report`, with the failing stage's own report as the cause.

use std::fmt;

/// Errors from building or compiling a stage graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A stage with this name is already registered.
    DuplicateStage { name: String },
    /// A referenced stage has not been registered.
    UnknownStage { name: String },
    /// The name is reserved for the terminal marker.
    ReservedName { name: String },
    /// The entry point was already set.
    EntryAlreadySet { existing: String },
    /// A branch map does not cover every key the router declares.
    IncompleteBranchMap { stage: String, missing: Vec<String> },
    /// Compilation found one or more structural violations.
    Validation { violations: Vec<GraphViolation> },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateStage { name } => write!(f, "stage '{name}' is already registered"),
            Self::UnknownStage { name } => write!(f, "unknown stage '{name}'"),
            Self::ReservedName { name } => {
                write!(f, "'{name}' is reserved for the terminal marker")
            }
            Self::EntryAlreadySet { existing } => {
                write!(f, "entry point already set to '{existing}'")
            }
            Self::IncompleteBranchMap { stage, missing } => {
                write!(
                    f,
                    "branch map for stage '{stage}' is missing keys: {}",
                    missing.join(", ")
                )
            }
            Self::Validation { violations } => {
                write!(
                    f,
                    "graph validation failed with {} violation(s)",
                    violations.len()
                )?;
                for violation in violations {
                    write!(f, "\n  - {violation}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// A single structural problem found by `StateGraph::compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphViolation {
    /// No entry point was set.
    MissingEntry,
    /// A non-terminal stage has no outgoing transition.
    MissingTransition { stage: String },
    /// A stage has more than one outgoing transition.
    ConflictingTransitions { stage: String },
    /// A stage marked terminal also has an outgoing transition.
    TerminalHasTransition { stage: String },
    /// A stage cannot be reached from the entry point.
    Unreachable { stage: String },
    /// These stages form a cycle.
    Cycle { stages: Vec<String> },
}

impl fmt::Display for GraphViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntry => write!(f, "no entry point set"),
            Self::MissingTransition { stage } => {
                write!(
                    f,
                    "stage '{stage}' has no outgoing transition and is not terminal"
                )
            }
            Self::ConflictingTransitions { stage } => {
                write!(f, "stage '{stage}' has more than one outgoing transition")
            }
            Self::TerminalHasTransition { stage } => {
                write!(f, "terminal stage '{stage}' has an outgoing transition")
            }
            Self::Unreachable { stage } => {
                write!(f, "stage '{stage}' is unreachable from the entry point")
            }
            Self::Cycle { stages } => write!(f, "cycle through {}", stages.join(" -> ")),
        }
    }
}

/// Errors during a single run of a compiled graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The run visited more stages than the step budget allows.
    StepBudgetExceeded { budget: usize, visited: Vec<String> },
    /// A stage transform failed. The stage's report is attached as the cause.
    StageFailed { stage: String },
    /// A router returned a key that its branch map does not contain.
    UnmappedBranch { stage: String, key: String },
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StepBudgetExceeded { budget, visited } => {
                write!(
                    f,
                    "step budget of {budget} exceeded after visiting {}",
                    visited.join(" -> ")
                )
            }
            Self::StageFailed { stage } => write!(f, "stage '{stage}' failed"),
            Self::UnmappedBranch { stage, key } => {
                write!(
                    f,
                    "router after stage '{stage}' returned unmapped key '{key}'"
                )
            }
        }
    }
}

impl std::error::Error for ExecutionError {}

impl ExecutionError {
    /// Returns the stage the error is attributed to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::StepBudgetExceeded { visited, .. } => visited.last().map(String::as_str),
            Self::StageFailed { stage } | Self::UnmappedBranch { stage, .. } => Some(stage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::DuplicateStage {
            name: "intake".to_string(),
        };
        assert!(err.to_string().contains("'intake' is already registered"));
    }

    #[test]
    fn incomplete_branch_map_lists_missing_keys() {
        let err = GraphError::IncompleteBranchMap {
            stage: "classifier".to_string(),
            missing: vec!["billing".to_string(), "general".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "branch map for stage 'classifier' is missing keys: billing, general"
        );
    }

    #[test]
    fn validation_error_enumerates_violations() {
        let err = GraphError::Validation {
            violations: vec![
                GraphViolation::MissingEntry,
                GraphViolation::Unreachable {
                    stage: "orphan".to_string(),
                },
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("2 violation(s)"));
        assert!(rendered.contains("no entry point set"));
        assert!(rendered.contains("'orphan' is unreachable"));
    }

    #[test]
    fn execution_error_display() {
        let err = ExecutionError::StepBudgetExceeded {
            budget: 2,
            visited: vec!["a".to_string(), "b".to_string()],
        };
        assert!(err.to_string().contains("a -> b"));
        assert_eq!(err.stage(), Some("b"));

        let err = ExecutionError::StageFailed {
            stage: "classifier".to_string(),
        };
        assert_eq!(err.to_string(), "stage 'classifier' failed");
        assert_eq!(err.stage(), Some("classifier"));
    }
}
