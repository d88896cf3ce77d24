//! Centralized server configuration.
//!
//! Configuration is loaded via the `config` crate from environment
//! variables prefixed with `TRIAGE__`, using `__` to reach nested fields:
//!
//! ```text
//! TRIAGE__PORT=9000
//! TRIAGE__LLM__MODEL=llama-3.1-8b-instant
//! TRIAGE__ESCALATION_KEYWORDS=lawyer,refund
//! ```
//!
//! `GROQ_API_KEY` is honored as a fallback for `TRIAGE__LLM__API_KEY`.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use triage_agents::stages::DEFAULT_ESCALATION_KEYWORDS;
use triage_ai::{LlmBackendConfig, LlmProvider};
use triage_core::DEFAULT_TICKET_PREFIX;

const ENV_PREFIX: &str = "TRIAGE";
const API_KEY_FALLBACK_VAR: &str = "GROQ_API_KEY";

/// Server configuration composed from library configs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Prefix for generated ticket ids.
    #[serde(default = "default_ticket_id_prefix")]
    pub ticket_id_prefix: String,

    /// Number of history entries returned with a processed ticket.
    #[serde(default = "default_max_history_display")]
    pub max_history_display: usize,

    /// JSON file holding the FAQ knowledge base.
    #[serde(default = "default_faq_database_path")]
    pub faq_database_path: PathBuf,

    /// Text-generation backend.
    #[serde(default)]
    pub llm: LlmBackendConfig,

    /// Words that escalate a ticket without consulting the backend.
    #[serde(default = "default_escalation_keywords")]
    pub escalation_keywords: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_ticket_id_prefix() -> String {
    DEFAULT_TICKET_PREFIX.to_string()
}

fn default_max_history_display() -> usize {
    50
}

fn default_faq_database_path() -> PathBuf {
    PathBuf::from("data/faq_database.json")
}

fn default_escalation_keywords() -> Vec<String> {
    DEFAULT_ESCALATION_KEYWORDS
        .iter()
        .map(|k| (*k).to_string())
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ticket_id_prefix: default_ticket_id_prefix(),
            max_history_display: default_max_history_display(),
            faq_database_path: default_faq_database_path(),
            llm: LlmBackendConfig::default(),
            escalation_keywords: default_escalation_keywords(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be converted to its field type.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(environment(), std::env::var(API_KEY_FALLBACK_VAR).ok())
    }

    fn load(source: Environment, fallback_api_key: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(key) = fallback_api_key.filter(|k| !k.trim().is_empty()) {
            builder = builder.set_default("llm.api_key", key)?;
        }
        builder.add_source(source).build()?.try_deserialize()
    }

    /// Checks settings that serde defaults cannot guard.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Message`] if a hosted provider has no API key
    /// or the ticket prefix is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let hosted = matches!(self.llm.provider, LlmProvider::Groq | LlmProvider::OpenAi);
        let has_key = self
            .llm
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if hosted && !has_key {
            return Err(ConfigError::Message(format!(
                "llm.api_key is required for provider {}; set TRIAGE__LLM__API_KEY or {API_KEY_FALLBACK_VAR}",
                self.llm.provider
            )));
        }
        if self.ticket_id_prefix.trim().is_empty() {
            return Err(ConfigError::Message(
                "ticket_id_prefix must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the `host:port` pair to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("escalation_keywords")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_from(vars: &[(&str, &str)], fallback: Option<&str>) -> ServerConfig {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ServerConfig::load(
            environment().source(Some(source)),
            fallback.map(str::to_string),
        )
        .expect("load config")
    }

    #[test]
    fn defaults_without_environment() {
        let config = load_from(&[], None);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.ticket_id_prefix, "TKT");
        assert_eq!(config.max_history_display, 50);
        assert_eq!(
            config.faq_database_path,
            PathBuf::from("data/faq_database.json")
        );
        assert_eq!(config.llm, LlmBackendConfig::default());
        assert_eq!(config.escalation_keywords.len(), 10);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn nested_and_list_values_from_environment() {
        let config = load_from(
            &[
                ("TRIAGE__PORT", "9000"),
                ("TRIAGE__TICKET_ID_PREFIX", "SUP"),
                ("TRIAGE__LLM__MODEL", "llama-3.1-8b-instant"),
                ("TRIAGE__LLM__API_KEY", "gsk-test"),
                ("TRIAGE__LLM__TEMPERATURE", "0.5"),
                ("TRIAGE__ESCALATION_KEYWORDS", "lawyer,refund"),
            ],
            None,
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.ticket_id_prefix, "SUP");
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.llm.temperature, 0.5);
        assert_eq!(config.llm.base_url, LlmBackendConfig::GROQ_BASE_URL);
        assert_eq!(config.escalation_keywords, ["lawyer", "refund"]);
    }

    #[test]
    fn fallback_api_key_yields_to_prefixed_variable() {
        let config = load_from(&[], Some("from-fallback"));
        assert_eq!(config.llm.api_key.as_deref(), Some("from-fallback"));

        let config = load_from(
            &[("TRIAGE__LLM__API_KEY", "prefixed")],
            Some("from-fallback"),
        );
        assert_eq!(config.llm.api_key.as_deref(), Some("prefixed"));
    }

    #[test]
    fn hosted_provider_requires_api_key() {
        let mut config = ServerConfig::default();
        assert!(config.validate().is_err());

        config.llm.api_key = Some("gsk-test".to_string());
        assert!(config.validate().is_ok());

        config.llm = LlmBackendConfig::openai_compatible("http://localhost:11434/v1", "llama3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_ticket_prefix_is_rejected() {
        let config = ServerConfig {
            ticket_id_prefix: "  ".to_string(),
            llm: LlmBackendConfig::groq(Some("gsk-test".to_string())),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
