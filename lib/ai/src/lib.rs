//! Text-generation primitives for ticket triage.
//!
//! - **Backend**: the [`LlmBackend`] trait every provider implements
//! - **LLM Call**: single-shot request building, optionally from a template
//! - **Prompts**: named templates with `{{variable}}` placeholders
//! - **OpenAI-compatible client**: a reqwest backend for chat-completion
//!   APIs such as Groq
//! - **Scripted backend**: canned replies for offline runs and tests

pub mod backend;
pub mod error;
pub mod llm_call;
pub mod openai;
pub mod prompt;
pub mod scripted;

pub use backend::{LlmBackend, LlmBackendConfig, LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use error::{LlmError, PromptError};
pub use llm_call::LlmCall;
pub use openai::OpenAiCompatibleBackend;
pub use prompt::{PromptRegistry, PromptTemplate, VariableDefinition};
pub use scripted::ScriptedBackend;
