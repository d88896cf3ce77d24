//! Timed access to the text-generation backend.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use triage_ai::{LlmBackend, LlmCall, LlmError};

/// Shared handle to an [`LlmBackend`] with a per-call timeout.
///
/// Cloning is cheap; every stage of a workflow holds its own clone.
#[derive(Clone)]
pub struct Generator {
    backend: Arc<dyn LlmBackend>,
    timeout: Duration,
    default_temperature: f32,
}

impl Generator {
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Creates a generator that gives up on any call after `timeout`.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            default_temperature: Self::DEFAULT_TEMPERATURE,
        }
    }

    /// Sets the temperature used by stages without a fixed one.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = temperature;
        self
    }

    #[must_use]
    pub fn default_temperature(&self) -> f32 {
        self.default_temperature
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends the call and returns the generated text.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Timeout`] if the backend does not answer within
    /// the timeout, or whatever error the backend reports.
    pub async fn complete(&self, call: LlmCall) -> Result<String, LlmError> {
        let request = call.build_request();
        match tokio::time::timeout(self.timeout, self.backend.generate(&request)).await {
            Ok(Ok(response)) => {
                debug!(
                    model = %response.model,
                    tokens = response.usage.total(),
                    "generation complete"
                );
                Ok(response.content)
            }
            Ok(Err(err)) => {
                warn!(
                    provider = %self.backend.provider(),
                    transient = err.is_transient(),
                    error = %err,
                    "generation failed"
                );
                Err(err)
            }
            Err(_) => {
                warn!(
                    provider = %self.backend.provider(),
                    timeout_ms = self.timeout.as_millis(),
                    "generation timed out"
                );
                Err(LlmError::Timeout {
                    after: self.timeout,
                })
            }
        }
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.backend.provider())
            .field("model", &self.backend.model())
            .field("timeout", &self.timeout)
            .field("default_temperature", &self.default_temperature)
            .finish()
    }
}
