//! Prompt template registry.
//!
//! Templates use `{{variable_name}}` placeholders. Rendering is a single
//! left-to-right pass, so text substituted into a template is never itself
//! scanned for placeholders.

use crate::error::PromptError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

/// Definition of a template variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    /// Description of what this variable is for.
    pub description: String,
    /// Whether this variable is required.
    pub required: bool,
    /// Default value if not provided.
    pub default: Option<JsonValue>,
}

impl VariableDefinition {
    /// Creates a required variable definition.
    #[must_use]
    pub fn required(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            required: true,
            default: None,
        }
    }

    /// Creates an optional variable definition.
    #[must_use]
    pub fn optional(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            required: false,
            default: None,
        }
    }

    /// Sets a default value.
    #[must_use]
    pub fn with_default(mut self, default: JsonValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// A named prompt template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template name (used for lookup).
    pub name: String,
    /// Template content with placeholders.
    pub content: String,
    /// Optional system prompt template.
    pub system_prompt: Option<String>,
    /// Description of what this template is for.
    pub description: Option<String>,
    /// Variable definitions keyed by name.
    pub variables: BTreeMap<String, VariableDefinition>,
}

impl PromptTemplate {
    /// Creates a new prompt template.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            system_prompt: None,
            description: None,
            variables: BTreeMap::new(),
        }
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a variable definition.
    #[must_use]
    pub fn with_variable(
        mut self,
        name: impl Into<String>,
        definition: VariableDefinition,
    ) -> Self {
        self.variables.insert(name.into(), definition);
        self
    }

    /// Renders the template with the given variables.
    ///
    /// Placeholders with neither a value nor a default are left as written.
    #[must_use]
    pub fn render(&self, variables: &HashMap<String, JsonValue>) -> String {
        self.substitute(&self.content, variables)
    }

    /// Renders the system prompt with the given variables.
    #[must_use]
    pub fn render_system_prompt(&self, variables: &HashMap<String, JsonValue>) -> Option<String> {
        self.system_prompt
            .as_ref()
            .map(|template| self.substitute(template, variables))
    }

    /// Validates that all required variables are provided.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::MissingVariables`] naming every required
    /// variable that has neither a value nor a default.
    pub fn validate_variables(
        &self,
        variables: &HashMap<String, JsonValue>,
    ) -> Result<(), PromptError> {
        let missing: Vec<String> = self
            .variables
            .iter()
            .filter(|(_, def)| def.required && def.default.is_none())
            .filter(|(name, _)| !variables.contains_key(*name))
            .map(|(name, _)| name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PromptError::MissingVariables {
                template: self.name.clone(),
                variables: missing,
            })
        }
    }

    fn lookup(&self, name: &str, variables: &HashMap<String, JsonValue>) -> Option<String> {
        let default = || self.variables.get(name)?.default.as_ref();
        let value = variables.get(name).or_else(default)?;
        Some(match value {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn substitute(&self, template: &str, variables: &HashMap<String, JsonValue>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                out.push_str(&rest[open..]);
                return out;
            };
            let name = after[..close].trim();
            match self.lookup(name, variables) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&rest[open..open + 2 + close + 2]),
            }
            rest = &after[close + 2..];
        }
        out.push_str(rest);
        out
    }
}

/// Registry of prompt templates.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Registers a template, replacing any with the same name.
    pub fn register(&mut self, template: PromptTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Gets a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.get(name)
    }

    /// Gets a template by name, failing if it is not registered.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::TemplateNotFound`].
    pub fn require(&self, name: &str) -> Result<&PromptTemplate, PromptError> {
        self.get(name).ok_or_else(|| PromptError::TemplateNotFound {
            name: name.to_string(),
        })
    }

    /// Returns all registered templates.
    pub fn all(&self) -> impl Iterator<Item = &PromptTemplate> {
        self.templates.values()
    }

    /// Returns the number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
