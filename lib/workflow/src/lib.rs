//! Stage graph engine for support ticket triage.
//!
//! Workflows are declared as a [`StateGraph`] of named stages joined by
//! direct edges and routed branches, validated once by
//! [`StateGraph::compile`], and then run any number of times through the
//! resulting [`CompiledGraph`]:
//!
//! - **Stages**: async transforms that take the run state by value
//! - **Routers**: pure branch decisions evaluated on a stage's output
//! - **Execution**: a single sequential walk from the entry to [`END`]
//!
//! The engine is generic over the state type. The ticket-specific routers
//! live in [`routing`].

mod edge;
pub mod error;
pub mod execution;
pub mod graph;
pub mod router;
pub mod routing;
pub mod stage;

pub use error::{ExecutionError, GraphError, GraphViolation};
pub use execution::{CompiledGraph, RunOutcome};
pub use graph::{END, StateGraph};
pub use router::{BranchKey, FnRouter, Router, router_fn};
pub use routing::{CategoryRouter, EscalationRouter};
pub use stage::{FnStage, Stage, StageResult, stage_fn};
