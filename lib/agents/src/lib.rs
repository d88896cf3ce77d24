//! Support ticket stages for the triage workflow.
//!
//! This crate supplies the domain half of the engine:
//!
//! - **Stages**: intake, FAQ lookup, classification, specialist
//!   resolutions, escalation and the final replies
//! - **Generator**: backend access with a per-call timeout
//! - **Knowledge base**: the FAQ document the lookup stage searches
//! - **Workflow**: [`support_workflow`] wires the stages into a compiled
//!   graph

pub mod error;
pub mod generator;
pub mod knowledge_base;
pub mod prompts;
pub mod stages;
pub mod workflow;

pub use error::{FaqError, StageError};
pub use generator::Generator;
pub use knowledge_base::{FaqDatabase, FaqEntry};
pub use stages::StageDeps;
pub use workflow::{stage_names, support_workflow};
