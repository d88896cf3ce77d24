//! Compiled graphs and the executor loop.
//!
//! A [`CompiledGraph`] is immutable and holds no per-run state, so one
//! instance can serve any number of concurrent runs as long as each run
//! supplies its own state value. Within a run, stages execute strictly one
//! after another: the executor passes the state to the current stage,
//! takes it back, and picks the next stage from the post-transform state.

use crate::error::ExecutionError;
use crate::router::{BranchKey, Router};
use crate::stage::Stage;
use rootcause::prelude::{Report, ResultExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Resolved destination of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Index of the next stage.
    Stage(usize),
    /// The run is finished.
    End,
}

/// How the executor leaves a stage.
pub(crate) enum Next<S> {
    Direct(Step),
    Conditional {
        router: Arc<dyn Router<S>>,
        branches: BTreeMap<BranchKey, Step>,
    },
}

pub(crate) struct CompiledStage<S: Send + 'static> {
    pub(crate) name: String,
    pub(crate) stage: Arc<dyn Stage<S>>,
    pub(crate) next: Next<S>,
}

/// The final state of a run together with the stages it passed through.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<S> {
    /// State returned by the last stage.
    pub state: S,
    /// Stage names in execution order.
    pub visited: Vec<String>,
}

/// An executable, validated stage graph.
pub struct CompiledGraph<S: Send + 'static> {
    nodes: Vec<CompiledStage<S>>,
    entry: usize,
    step_budget: usize,
}

impl<S: Send + 'static> CompiledGraph<S> {
    pub(crate) fn new(nodes: Vec<CompiledStage<S>>, entry: usize) -> Self {
        let step_budget = nodes.len();
        Self {
            nodes,
            entry,
            step_budget,
        }
    }

    /// Overrides the maximum number of stage executions per run.
    ///
    /// Defaults to the number of registered stages.
    #[must_use]
    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    /// Returns the step budget.
    #[must_use]
    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// Returns the entry stage name.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.nodes[self.entry].name
    }

    /// Returns stage names in registration order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.name.as_str())
    }

    /// Runs the graph from the entry stage and returns the final state.
    ///
    /// # Errors
    ///
    /// See [`CompiledGraph::invoke_traced`].
    pub async fn invoke(&self, initial_state: S) -> Result<S, Report<ExecutionError>> {
        self.invoke_traced(initial_state)
            .await
            .map(|outcome| outcome.state)
    }

    /// Runs the graph and also reports the stages visited.
    ///
    /// # Errors
    ///
    /// - [`ExecutionError::StageFailed`] if a stage returns an error. The
    ///   stage's report is kept as the cause and nothing is retried.
    /// - [`ExecutionError::StepBudgetExceeded`] if the run would execute more
    ///   stages than the budget allows.
    /// - [`ExecutionError::UnmappedBranch`] if a router returns a key its
    ///   branch map does not contain.
    #[instrument(skip_all, fields(entry = %self.entry()))]
    pub async fn invoke_traced(
        &self,
        initial_state: S,
    ) -> Result<RunOutcome<S>, Report<ExecutionError>> {
        let mut state = initial_state;
        let mut current = self.entry;
        let mut visited: Vec<String> = Vec::new();

        loop {
            if visited.len() >= self.step_budget {
                warn!(budget = self.step_budget, visited = ?visited, "step budget exceeded");
                return Err(ExecutionError::StepBudgetExceeded {
                    budget: self.step_budget,
                    visited,
                }
                .into());
            }

            let node = &self.nodes[current];
            visited.push(node.name.clone());
            debug!(stage = %node.name, step = visited.len(), "running stage");

            state = node.stage.run(state).await.context(ExecutionError::StageFailed {
                stage: node.name.clone(),
            })?;

            let step = match &node.next {
                Next::Direct(step) => *step,
                Next::Conditional { router, branches } => {
                    let key = router.route(&state);
                    match branches.get(&key) {
                        Some(step) => *step,
                        None => {
                            warn!(stage = %node.name, key = %key, "router returned unmapped key");
                            return Err(ExecutionError::UnmappedBranch {
                                stage: node.name.clone(),
                                key: key.to_string(),
                            }
                            .into());
                        }
                    }
                }
            };

            match step {
                Step::Stage(next) => {
                    debug!(from = %node.name, to = %self.nodes[next].name, "transition");
                    current = next;
                }
                Step::End => {
                    debug!(stage = %node.name, steps = visited.len(), "run complete");
                    return Ok(RunOutcome { state, visited });
                }
            }
        }
    }
}

impl<S: Send + 'static> std::fmt::Debug for CompiledGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<_> = self.nodes.iter().map(|n| n.name.as_str()).collect();
        f.debug_struct("CompiledGraph")
            .field("stages", &stages)
            .field("entry", &self.nodes[self.entry].name)
            .field("step_budget", &self.step_budget)
            .finish()
    }
}
