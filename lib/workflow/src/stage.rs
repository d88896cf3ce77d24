//! Stage abstraction.
//!
//! A stage is a named transform over the run state. The executor hands the
//! state to a stage by value and receives it back, so a stage holds
//! exclusive ownership for the duration of its call.

use async_trait::async_trait;
use rootcause::Report;

/// Result returned by a stage transform.
///
/// Any error type is accepted; it is erased into a dynamic report.
pub type StageResult<S> = Result<S, Report>;

/// A transform applied to the run state.
#[async_trait]
pub trait Stage<S: Send + 'static>: Send + Sync {
    /// Runs the transform.
    ///
    /// # Errors
    ///
    /// Returns an error if the transform cannot complete. The executor
    /// propagates it without retrying.
    async fn run(&self, state: S) -> StageResult<S>;
}

/// A stage backed by a synchronous closure.
pub struct FnStage<F> {
    transform: F,
}

#[async_trait]
impl<S, F> Stage<S> for FnStage<F>
where
    S: Send + 'static,
    F: Fn(S) -> StageResult<S> + Send + Sync,
{
    async fn run(&self, state: S) -> StageResult<S> {
        (self.transform)(state)
    }
}

/// Adapts a synchronous closure into a [`Stage`].
pub fn stage_fn<S, F>(transform: F) -> FnStage<F>
where
    S: Send + 'static,
    F: Fn(S) -> StageResult<S> + Send + Sync,
{
    FnStage { transform }
}
