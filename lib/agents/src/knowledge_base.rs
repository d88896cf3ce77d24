//! FAQ knowledge base.
//!
//! Stored as a JSON document of the form `{"faqs": [{"question": ...,
//! "answer": ..., "category": ...}]}`. The server loads it once at startup
//! and shares it read-only between runs.

use crate::error::FaqError;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

/// One question and its canned answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The full set of FAQ entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqDatabase {
    #[serde(default)]
    pub faqs: Vec<FaqEntry>,
}

impl FaqDatabase {
    #[must_use]
    pub fn new(faqs: Vec<FaqEntry>) -> Self {
        Self { faqs }
    }

    /// Loads the database from `path`.
    ///
    /// A missing file yields an empty database.
    ///
    /// # Errors
    ///
    /// Returns [`FaqError::Read`] if the file exists but cannot be read, or
    /// [`FaqError::Parse`] if it is not a valid FAQ document.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Report<FaqError>> {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "FAQ database not found, using empty database");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(FaqError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }
                .into());
            }
        };

        let database: Self = serde_json::from_str(&raw).map_err(|e| FaqError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!(path = %path.display(), entries = database.len(), "loaded FAQ database");
        Ok(database)
    }

    /// Writes the database to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`FaqError::Write`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Report<FaqError>> {
        let path = path.as_ref();
        let write_error = |reason: String| FaqError::Write {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| write_error(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| write_error(e.to_string()))?;

        debug!(path = %path.display(), entries = self.len(), "saved FAQ database");
        Ok(())
    }

    /// Appends an entry.
    pub fn add_entry(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
        category: Option<String>,
    ) {
        self.faqs.push(FaqEntry {
            question: question.into(),
            answer: answer.into(),
            category,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.faqs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faqs.is_empty()
    }

    /// Formats every entry as `Q: ...` / `A: ...` lines for a prompt.
    #[must_use]
    pub fn prompt_listing(&self) -> String {
        self.faqs
            .iter()
            .map(|faq| format!("Q: {}\nA: {}", faq.question, faq.answer))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let database = FaqDatabase::load(dir.path().join("absent.json")).expect("load");
        assert!(database.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faq.json");
        std::fs::write(&path, "{not json").expect("write");

        let report = FaqDatabase::load(&path).unwrap_err();
        assert!(matches!(report.current_context(), FaqError::Parse { .. }));
    }

    #[test]
    fn save_then_load_preserves_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("faq.json");

        let mut database = FaqDatabase::default();
        database.add_entry(
            "How do I reset my password?",
            "Use the 'Forgot password' link on the sign-in page.",
            Some("GENERAL".to_string()),
        );
        database.add_entry("Do you offer refunds?", "Within 30 days of purchase.", None);
        database.save(&path).expect("save");

        assert_eq!(FaqDatabase::load(&path).expect("load"), database);
    }

    #[test]
    fn entries_without_category_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("faq.json");
        std::fs::write(
            &path,
            r#"{"faqs": [{"question": "Where is my invoice?", "answer": "Under Billing > Invoices."}]}"#,
        )
        .expect("write");

        let database = FaqDatabase::load(&path).expect("load");
        assert_eq!(database.len(), 1);
        assert_eq!(database.faqs[0].category, None);
    }

    #[test]
    fn prompt_listing_format() {
        let database = FaqDatabase::new(vec![
            FaqEntry {
                question: "Q1?".to_string(),
                answer: "A1".to_string(),
                category: None,
            },
            FaqEntry {
                question: "Q2?".to_string(),
                answer: "A2".to_string(),
                category: None,
            },
        ]);
        assert_eq!(database.prompt_listing(), "Q: Q1?\nA: A1\nQ: Q2?\nA: A2");
    }
}
