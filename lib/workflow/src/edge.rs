//! Transition types for stage graphs.
//!
//! Each stage leaves through a single transition: a direct edge to a fixed
//! target, or a router whose result is looked up in a branch map.

use crate::router::{BranchKey, Router};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Destination of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    /// A registered stage.
    Stage(String),
    /// The terminal marker.
    End,
}

/// An outgoing transition as declared on the builder.
pub(crate) enum Transition<S> {
    Direct(Target),
    Conditional {
        router: Arc<dyn Router<S>>,
        branches: BTreeMap<BranchKey, Target>,
    },
}

impl<S> Transition<S> {
    /// Returns every target this transition can lead to.
    pub(crate) fn targets(&self) -> Vec<&Target> {
        match self {
            Self::Direct(target) => vec![target],
            Self::Conditional { branches, .. } => branches.values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::router_fn;

    #[test]
    fn conditional_targets_cover_branch_map() {
        let router = router_fn(["a", "b"], |_: &u8| BranchKey::from("a"));
        let transition: Transition<u8> = Transition::Conditional {
            router: Arc::new(router),
            branches: BTreeMap::from([
                (BranchKey::from("a"), Target::Stage("x".to_string())),
                (BranchKey::from("b"), Target::End),
            ]),
        };
        assert_eq!(
            transition.targets(),
            vec![&Target::Stage("x".to_string()), &Target::End]
        );

        let direct: Transition<u8> = Transition::Direct(Target::End);
        assert_eq!(direct.targets(), vec![&Target::End]);
    }
}
