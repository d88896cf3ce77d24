//! Ticket identifiers.
//!
//! Ticket ids are opaque strings. Ids supplied by callers are accepted
//! verbatim; generated ids take the form `{prefix}-{8 characters}` where the
//! characters come from the random half of a fresh ULID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Prefix used when no other prefix is configured.
pub const DEFAULT_TICKET_PREFIX: &str = "TKT";

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Unique identifier for a support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Generates a new ticket id with the given prefix.
    #[must_use]
    pub fn generate(prefix: &str) -> Self {
        let encoded = Ulid::new().to_string();
        // The last 16 characters of a ULID are its random component.
        let suffix = &encoded[encoded.len() - 8..];
        Self(format!("{prefix}-{suffix}"))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TicketId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseIdError {
                id_type: "TicketId",
                reason: "ticket id must not be blank".to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl AsRef<str> for TicketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_has_prefix_and_suffix() {
        let id = TicketId::generate(DEFAULT_TICKET_PREFIX);
        let (prefix, suffix) = id.as_str().split_once('-').expect("dash separator");
        assert_eq!(prefix, "TKT");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(suffix, suffix.to_ascii_uppercase());
    }

    #[test]
    fn generated_ids_differ() {
        let a = TicketId::generate("SUP");
        let b = TicketId::generate("SUP");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("SUP-"));
    }

    #[test]
    fn parse_accepts_caller_ids_verbatim() {
        let id: TicketId = "CUSTOM-42".parse().expect("should parse");
        assert_eq!(id.as_str(), "CUSTOM-42");
        assert_eq!(id.to_string(), "CUSTOM-42");
    }

    #[test]
    fn parse_rejects_blank() {
        let result: Result<TicketId, _> = "   ".parse();
        let err = result.unwrap_err();
        assert_eq!(err.id_type, "TicketId");
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id: TicketId = "TKT-ABCDEFGH".parse().expect("should parse");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"TKT-ABCDEFGH\"");
    }
}
