//! OpenAI-compatible chat-completion backend.
//!
//! Works against any server exposing `POST {base_url}/chat/completions` with
//! bearer authentication, Groq included.

use crate::backend::{
    LlmBackend, LlmBackendConfig, LlmProvider, LlmRequest, LlmResponse, TokenUsage,
};
use crate::error::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(model: &'a str, request: &'a LlmRequest) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        Self {
            model,
            messages,
            temperature: request.temperature.map(wire_temperature),
            max_tokens: request.max_tokens,
        }
    }
}

/// Widens a temperature through its shortest decimal form, so `0.3_f32`
/// goes out as `0.3` rather than `0.30000001192092896`.
fn wire_temperature(t: f32) -> f64 {
    t.to_string().parse().unwrap_or(f64::from(t))
}

impl ChatCompletionResponse {
    fn into_response(self) -> Result<LlmResponse, LlmError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseParseFailed {
                reason: "response contained no message content".to_string(),
            })?;
        let usage = self
            .usage
            .map(|usage| TokenUsage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            usage,
            model: self.model,
        })
    }
}

/// Maps a non-success HTTP status to an [`LlmError`].
fn error_for_status(status: u16, retry_after_secs: Option<u64>, body: &str) -> LlmError {
    if status == 429 {
        return LlmError::RateLimited { retry_after_secs };
    }
    if body.trim().is_empty() {
        return LlmError::RequestFailed {
            status,
            detail: "empty response body".to_string(),
        };
    }
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string());
    LlmError::RequestFailed { status, detail }
}

/// A backend for OpenAI-compatible chat-completion APIs.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleBackend {
    client: Client,
    config: LlmBackendConfig,
}

impl OpenAiCompatibleBackend {
    /// Creates a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidConfig`] if the base URL or model is empty
    /// or the HTTP client cannot be built.
    pub fn new(config: LlmBackendConfig) -> Result<Self, LlmError> {
        if config.base_url.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "base_url is empty".to_string(),
            });
        }
        if config.model.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "model is empty".to_string(),
            });
        }
        if config.api_key.is_none() {
            warn!(
                provider = %config.provider,
                "no API key configured; requests are unauthenticated"
            );
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn transport_error(&self, err: &reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout {
                after: self.config.timeout(),
            }
        } else {
            LlmError::ProviderUnavailable {
                provider: self.config.provider.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    #[instrument(skip_all, fields(provider = %self.config.provider, model = %self.config.model))]
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = ChatCompletionRequest::from_request(&self.config.model, request);

        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok());
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        status = status.as_u16(),
                        error = %e,
                        "failed to read error response body"
                    );
                    String::new()
                }
            };
            let err = error_for_status(status.as_u16(), retry_after, &text);
            warn!(status = status.as_u16(), error = %err, "chat completion rejected");
            return Err(err);
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout {
                    after: self.config.timeout(),
                }
            } else {
                LlmError::ResponseParseFailed {
                    reason: e.to_string(),
                }
            }
        })?;
        let response = parsed.into_response()?;
        debug!(tokens = response.usage.total(), "chat completion received");
        Ok(response)
    }

    fn provider(&self) -> LlmProvider {
        self.config.provider
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
