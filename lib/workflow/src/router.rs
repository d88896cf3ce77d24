//! Branch routing.
//!
//! A router is a pure decision function evaluated on the state a stage just
//! produced. It returns a [`BranchKey`] that is looked up in the branch map
//! registered alongside it. Routers declare every key they can return so
//! that incomplete branch maps are rejected when the graph is built.

use std::borrow::Cow;
use std::fmt;

/// Discrete value returned by a router.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchKey(Cow<'static, str>);

impl BranchKey {
    /// Creates a key from a static string.
    #[must_use]
    pub const fn from_static(key: &'static str) -> Self {
        Self(Cow::Borrowed(key))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for BranchKey {
    fn from(key: &'static str) -> Self {
        Self::from_static(key)
    }
}

impl From<String> for BranchKey {
    fn from(key: String) -> Self {
        Self(Cow::Owned(key))
    }
}

/// Selects the next stage at a branch point.
///
/// Implementations must be deterministic functions of the state and must
/// only ever return keys listed by [`Router::branches`].
pub trait Router<S>: Send + Sync {
    /// Chooses a branch for the given state.
    fn route(&self, state: &S) -> BranchKey;

    /// Every key this router can return.
    fn branches(&self) -> Vec<BranchKey>;
}

/// A router backed by a closure and an explicit key list.
pub struct FnRouter<F> {
    branches: Vec<BranchKey>,
    decide: F,
}

impl<S, F> Router<S> for FnRouter<F>
where
    F: Fn(&S) -> BranchKey + Send + Sync,
{
    fn route(&self, state: &S) -> BranchKey {
        (self.decide)(state)
    }

    fn branches(&self) -> Vec<BranchKey> {
        self.branches.clone()
    }
}

/// Adapts a closure into a [`Router`] that may return any of `branches`.
pub fn router_fn<S, F, K>(branches: impl IntoIterator<Item = K>, decide: F) -> FnRouter<F>
where
    F: Fn(&S) -> BranchKey + Send + Sync,
    K: Into<BranchKey>,
{
    FnRouter {
        branches: branches.into_iter().map(Into::into).collect(),
        decide,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_key_equality_ignores_ownership() {
        assert_eq!(BranchKey::from("left"), BranchKey::from("left".to_string()));
        assert_eq!(BranchKey::from_static("left").as_str(), "left");
    }

    #[test]
    fn fn_router_routes_and_declares_keys() {
        let router = router_fn(["even", "odd"], |n: &u32| {
            if n % 2 == 0 {
                BranchKey::from("even")
            } else {
                BranchKey::from("odd")
            }
        });

        assert_eq!(Router::<u32>::route(&router, &4), BranchKey::from("even"));
        assert_eq!(Router::<u32>::route(&router, &7), BranchKey::from("odd"));
        assert_eq!(
            Router::<u32>::branches(&router),
            vec![BranchKey::from("even"), BranchKey::from("odd")]
        );
    }
}
