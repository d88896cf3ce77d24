//! Stage transforms for the support workflow.
//!
//! Every stage takes the ticket by value, writes only the fields it owns,
//! appends exactly one history entry and hands the ticket back. Stages that
//! talk to the backend propagate generation failures instead of papering
//! over them, so a hung or failing backend surfaces as a failed run.

mod classifier;
mod escalation;
mod faq;
mod intake;
#[cfg(test)]
mod ownership;
mod response;
mod specialist;

pub use classifier::ClassifierStage;
pub use escalation::{DEFAULT_ESCALATION_KEYWORDS, EscalationCheckStage};
pub use faq::FaqLookupStage;
pub use intake::{IntakeStage, priority_for};
pub use response::{EscalationResponseStage, ResponseStage};
pub use specialist::{SpecialistStage, Specialty};

use crate::error::StageError;
use crate::generator::Generator;
use crate::knowledge_base::FaqDatabase;
use crate::prompts;
use rootcause::prelude::{Report, ResultExt};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use triage_ai::{LlmCall, PromptRegistry};

/// Everything the stages need from the outside world.
#[derive(Debug, Clone)]
pub struct StageDeps {
    pub generator: Generator,
    pub prompts: Arc<PromptRegistry>,
    pub faqs: Arc<FaqDatabase>,
    pub escalation_keywords: Arc<[String]>,
}

impl StageDeps {
    /// Creates dependencies with the built-in prompts and keyword list.
    #[must_use]
    pub fn new(generator: Generator, faqs: Arc<FaqDatabase>) -> Self {
        Self {
            generator,
            prompts: Arc::new(prompts::catalogue()),
            faqs,
            escalation_keywords: DEFAULT_ESCALATION_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }

    /// Replaces the auto-escalation keyword list. Keywords are matched
    /// case-insensitively.
    #[must_use]
    pub fn with_escalation_keywords(mut self, keywords: impl IntoIterator<Item = String>) -> Self {
        self.escalation_keywords = keywords.into_iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Renders `template` and returns the generated text.
    pub(crate) async fn generate(
        &self,
        template: &str,
        variables: &HashMap<String, JsonValue>,
        temperature: f32,
    ) -> Result<String, Report<StageError>> {
        let template_def = self.prompts.require(template).context(StageError::Prompt {
            template: template.to_string(),
        })?;
        let call = LlmCall::from_template(template_def, variables)
            .context(StageError::Prompt {
                template: template.to_string(),
            })?
            .with_temperature(temperature);

        self.generator
            .complete(call)
            .await
            .context(StageError::Generation {
                template: template.to_string(),
            })
    }
}

/// Builds a template variable map from string pairs.
pub(crate) fn vars<const N: usize>(pairs: [(&str, &str); N]) -> HashMap<String, JsonValue> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), JsonValue::from(value)))
        .collect()
}

/// Returns at most `max` characters of `text`.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn vars_builds_string_values() {
        let map = vars([("query", "help"), ("priority", "high")]);
        assert_eq!(map["query"], JsonValue::String("help".to_string()));
        assert_eq!(map.len(), 2);
    }
}
