//! LLM Call primitive.
//!
//! Single-shot inference: one prompt, an optional system prompt and sampling
//! settings, turned into an [`LlmRequest`] for whichever backend is in use.

use crate::backend::LlmRequest;
use crate::error::PromptError;
use crate::prompt::PromptTemplate;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// An LLM Call builder.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmCall {
    prompt: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl LlmCall {
    /// Creates a new LLM Call with the given prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Renders a template into a call.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::MissingVariables`] if a required variable has
    /// no value.
    pub fn from_template(
        template: &PromptTemplate,
        variables: &HashMap<String, JsonValue>,
    ) -> Result<Self, PromptError> {
        template.validate_variables(variables)?;
        Ok(Self {
            prompt: template.render(variables),
            system_prompt: template.render_system_prompt(variables),
            temperature: None,
            max_tokens: None,
        })
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Returns the rendered prompt.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Builds an LLM request from this call.
    #[must_use]
    pub fn build_request(&self) -> LlmRequest {
        let mut request = LlmRequest::new(self.prompt.clone());

        if let Some(ref system) = self.system_prompt {
            request = request.with_system(system.clone());
        }

        if let Some(temp) = self.temperature {
            request = request.with_temperature(temp);
        }

        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        request
    }
}
