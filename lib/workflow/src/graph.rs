//! Stage graph definition.
//!
//! A [`StateGraph`] declares the stage topology before any ticket is
//! processed:
//! - Stages are registered under unique names
//! - Exactly one stage is the entry point
//! - Each non-terminal stage has exactly one outgoing transition, either a
//!   direct edge or a router with a branch map
//! - Terminal stages end the run, as does any transition to [`END`]
//!
//! Builder operations reject bad references immediately. Structural checks
//! that need the whole graph (reachability, cycles, missing transitions) run
//! in [`StateGraph::compile`], which reports every violation it finds.

use crate::edge::{Target, Transition};
use crate::error::{GraphError, GraphViolation};
use crate::execution::{CompiledGraph, CompiledStage, Next, Step};
use crate::router::{BranchKey, Router};
use crate::stage::Stage;
use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Reserved name for the terminal marker.
pub const END: &str = "__end__";

struct StageEntry<S: Send + 'static> {
    name: String,
    stage: Arc<dyn Stage<S>>,
}

/// A declarative stage graph, compiled once into a [`CompiledGraph`].
pub struct StateGraph<S: Send + 'static> {
    stages: Vec<StageEntry<S>>,
    /// Map from stage name to its position in `stages`.
    index: HashMap<String, usize>,
    entry: Option<String>,
    transitions: HashMap<String, Vec<Transition<S>>>,
    terminals: HashSet<String>,
}

impl<S: Send + 'static> StateGraph<S> {
    /// Creates a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            index: HashMap::new(),
            entry: None,
            transitions: HashMap::new(),
            terminals: HashSet::new(),
        }
    }

    /// Registers a named stage.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateStage`] if the name is taken, or
    /// [`GraphError::ReservedName`] for [`END`].
    pub fn add_stage(
        &mut self,
        name: impl Into<String>,
        stage: impl Stage<S> + 'static,
    ) -> Result<&mut Self, GraphError> {
        let name = name.into();
        if name == END {
            return Err(GraphError::ReservedName { name });
        }
        if self.index.contains_key(&name) {
            return Err(GraphError::DuplicateStage { name });
        }

        self.index.insert(name.clone(), self.stages.len());
        self.stages.push(StageEntry {
            name,
            stage: Arc::new(stage),
        });
        Ok(self)
    }

    /// Sets the entry stage.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownStage`] if the stage is not registered,
    /// or [`GraphError::EntryAlreadySet`] if an entry was already chosen.
    pub fn set_entry(&mut self, name: &str) -> Result<&mut Self, GraphError> {
        self.require_stage(name)?;
        if let Some(existing) = &self.entry {
            return Err(GraphError::EntryAlreadySet {
                existing: existing.clone(),
            });
        }
        self.entry = Some(name.to_string());
        Ok(self)
    }

    /// Adds an unconditional transition. `to` may be [`END`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownStage`] if either endpoint is unregistered.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<&mut Self, GraphError> {
        self.require_stage(from)?;
        let target = self.resolve_target(to)?;
        self.transitions
            .entry(from.to_string())
            .or_default()
            .push(Transition::Direct(target));
        Ok(self)
    }

    /// Adds a routed transition.
    ///
    /// `branches` maps router keys to stage names or [`END`]. It must cover
    /// every key returned by [`Router::branches`]; extra keys are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownStage`] for an unregistered source or
    /// target, or [`GraphError::IncompleteBranchMap`] if a declared key is
    /// missing. Nothing is registered when an error is returned.
    pub fn add_conditional_edge<K, T>(
        &mut self,
        from: &str,
        router: impl Router<S> + 'static,
        branches: impl IntoIterator<Item = (K, T)>,
    ) -> Result<&mut Self, GraphError>
    where
        K: Into<BranchKey>,
        T: AsRef<str>,
    {
        self.require_stage(from)?;

        let mut map = BTreeMap::new();
        for (key, target) in branches {
            map.insert(key.into(), self.resolve_target(target.as_ref())?);
        }

        let missing: Vec<String> = router
            .branches()
            .into_iter()
            .filter(|key| !map.contains_key(key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GraphError::IncompleteBranchMap {
                stage: from.to_string(),
                missing,
            });
        }

        self.transitions
            .entry(from.to_string())
            .or_default()
            .push(Transition::Conditional {
                router: Arc::new(router),
                branches: map,
            });
        Ok(self)
    }

    /// Marks a stage as an exit point with no outgoing transitions.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownStage`] if the stage is not registered.
    pub fn mark_terminal(&mut self, name: &str) -> Result<&mut Self, GraphError> {
        self.require_stage(name)?;
        self.terminals.insert(name.to_string());
        Ok(self)
    }

    /// Returns the number of registered stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Validates the graph and produces its executable form.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Validation`] listing every violation found.
    pub fn compile(mut self) -> Result<CompiledGraph<S>, GraphError> {
        let violations = self.validate();
        if !violations.is_empty() {
            return Err(GraphError::Validation { violations });
        }

        let entry_name = self.entry.take().ok_or(GraphError::Validation {
            violations: vec![GraphViolation::MissingEntry],
        })?;
        let entry = self.index[&entry_name];

        let mut transitions = std::mem::take(&mut self.transitions);
        let index = &self.index;
        let resolve = |target: Target| match target {
            Target::End => Step::End,
            Target::Stage(name) => Step::Stage(index[&name]),
        };

        let nodes = self
            .stages
            .into_iter()
            .map(|entry| {
                let next = match transitions.remove(&entry.name).and_then(|mut t| t.pop()) {
                    None => Next::Direct(Step::End),
                    Some(Transition::Direct(target)) => Next::Direct(resolve(target)),
                    Some(Transition::Conditional { router, branches }) => Next::Conditional {
                        router,
                        branches: branches
                            .into_iter()
                            .map(|(key, target)| (key, resolve(target)))
                            .collect(),
                    },
                };
                CompiledStage {
                    name: entry.name,
                    stage: entry.stage,
                    next,
                }
            })
            .collect::<Vec<_>>();

        debug!(stages = nodes.len(), entry = %entry_name, "compiled stage graph");
        Ok(CompiledGraph::new(nodes, entry))
    }

    /// Collects every structural violation.
    fn validate(&self) -> Vec<GraphViolation> {
        let mut violations = Vec::new();

        if self.entry.is_none() {
            violations.push(GraphViolation::MissingEntry);
        }

        for entry in &self.stages {
            let count = self.transitions.get(&entry.name).map_or(0, Vec::len);
            let terminal = self.terminals.contains(&entry.name);
            if terminal && count > 0 {
                violations.push(GraphViolation::TerminalHasTransition {
                    stage: entry.name.clone(),
                });
            } else if !terminal && count == 0 {
                violations.push(GraphViolation::MissingTransition {
                    stage: entry.name.clone(),
                });
            }
            if count > 1 {
                violations.push(GraphViolation::ConflictingTransitions {
                    stage: entry.name.clone(),
                });
            }
        }

        let graph = self.topology();

        if let Some(entry) = &self.entry {
            let mut reachable = HashSet::new();
            let mut dfs = Dfs::new(&graph, NodeIndex::new(self.index[entry]));
            while let Some(node) = dfs.next(&graph) {
                reachable.insert(node.index());
            }
            for (position, stage) in self.stages.iter().enumerate() {
                if !reachable.contains(&position) {
                    violations.push(GraphViolation::Unreachable {
                        stage: stage.name.clone(),
                    });
                }
            }
        }

        if is_cyclic_directed(&graph) {
            for component in tarjan_scc(&graph) {
                let self_loop =
                    component.len() == 1 && graph.contains_edge(component[0], component[0]);
                if component.len() > 1 || self_loop {
                    let mut positions: Vec<usize> = component.iter().map(|n| n.index()).collect();
                    positions.sort_unstable();
                    violations.push(GraphViolation::Cycle {
                        stages: positions
                            .into_iter()
                            .map(|p| self.stages[p].name.clone())
                            .collect(),
                    });
                }
            }
        }

        violations
    }

    /// Builds a petgraph view of stage-to-stage transitions.
    ///
    /// Node indices match positions in `self.stages`; [`END`] has no node.
    fn topology(&self) -> DiGraph<(), ()> {
        let mut graph = DiGraph::with_capacity(self.stages.len(), self.stages.len());
        for _ in &self.stages {
            graph.add_node(());
        }
        for (from, transitions) in &self.transitions {
            let source = NodeIndex::new(self.index[from]);
            for transition in transitions {
                for target in transition.targets() {
                    if let Target::Stage(name) = target {
                        graph.update_edge(source, NodeIndex::new(self.index[name]), ());
                    }
                }
            }
        }
        graph
    }

    fn require_stage(&self, name: &str) -> Result<(), GraphError> {
        if self.index.contains_key(name) {
            Ok(())
        } else {
            Err(GraphError::UnknownStage {
                name: name.to_string(),
            })
        }
    }

    fn resolve_target(&self, name: &str) -> Result<Target, GraphError> {
        if name == END {
            return Ok(Target::End);
        }
        self.require_stage(name)?;
        Ok(Target::Stage(name.to_string()))
    }
}

impl<S: Send + 'static> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + 'static> std::fmt::Debug for StateGraph<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<_> = self.stages.iter().map(|s| s.name.as_str()).collect();
        f.debug_struct("StateGraph")
            .field("stages", &stages)
            .field("entry", &self.entry)
            .field("terminals", &self.terminals)
            .finish_non_exhaustive()
    }
}
