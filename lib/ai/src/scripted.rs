//! In-process backend with canned replies.
//!
//! Rules are checked in registration order against the system prompt and
//! the user prompt; the first rule whose needle appears in either decides
//! the outcome, otherwise the fallback reply is returned. Every request is
//! recorded so callers can inspect what was sent.

use crate::backend::{LlmBackend, LlmProvider, LlmRequest, LlmResponse};
use crate::error::LlmError;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
enum Outcome {
    Reply(String),
    Fail(LlmError),
}

#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    outcome: Outcome,
}

impl Rule {
    fn matches(&self, request: &LlmRequest) -> bool {
        let system = request.system.as_deref().unwrap_or_default();
        system.contains(&self.needle) || request.prompt.contains(&self.needle)
    }
}

/// A deterministic [`LlmBackend`].
#[derive(Debug)]
pub struct ScriptedBackend {
    rules: Vec<Rule>,
    fallback: String,
    delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedBackend {
    pub const MODEL: &'static str = "scripted";

    /// Creates a backend that answers every request with `fallback`.
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            fallback: fallback.into(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replies with `reply` when `needle` appears in the request.
    #[must_use]
    pub fn reply_when(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            outcome: Outcome::Reply(reply.into()),
        });
        self
    }

    /// Fails with `error` when `needle` appears in the request.
    #[must_use]
    pub fn fail_when(mut self, needle: impl Into<String>, error: LlmError) -> Self {
        self.rules.push(Rule {
            needle: needle.into(),
            outcome: Outcome::Fail(error),
        });
        self
    }

    /// Sleeps before answering each request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns a copy of every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of requests received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn outcome_for(&self, request: &LlmRequest) -> Outcome {
        self.rules
            .iter()
            .find(|rule| rule.matches(request))
            .map_or_else(
                || Outcome::Reply(self.fallback.clone()),
                |rule| rule.outcome.clone(),
            )
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.outcome_for(request) {
            Outcome::Reply(content) => {
                debug!(chars = content.len(), "scripted reply");
                Ok(LlmResponse::text(content, Self::MODEL))
            }
            Outcome::Fail(err) => Err(err),
        }
    }

    fn provider(&self) -> LlmProvider {
        LlmProvider::Scripted
    }

    fn model(&self) -> &str {
        Self::MODEL
    }
}
