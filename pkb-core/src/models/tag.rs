//! Tag name normalization and validation
//!
//! Tags are case-insensitive: names are trimmed and lowercased before they
//! reach the database, so `Python`, ` python ` and `PYTHON` are one tag.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ValidationError;

/// Maximum length for tag names
const MAX_TAG_NAME_LEN: usize = 64;

/// Starts with a letter or digit; the rest may also use `- _ . + # /`
/// so names like `c++`, `c#` and `ml/nlp` are accepted.
static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N}_.+#/-]*$").expect("invalid tag regex")
});

/// Validated, normalized tag name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Create a tag name, normalizing case and surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// use pkb_core::models::TagName;
    ///
    /// assert_eq!(TagName::new(" Rust ").unwrap().as_str(), "rust");
    /// assert!(TagName::new("two words").is_err());
    /// assert!(TagName::new("-leading-dash").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let normalized = s.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(ValidationError::Empty { field: "tag name" });
        }

        if normalized.chars().count() > MAX_TAG_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "tag name",
                max: MAX_TAG_NAME_LEN,
            });
        }

        if !TAG_RE.is_match(&normalized) {
            return Err(ValidationError::InvalidFormat {
                field: "tag name",
                value: normalized,
                reason: "must start with a letter or digit and contain only letters, digits, or - _ . + # /",
            });
        }

        Ok(Self(normalized))
    }

    /// Validate a batch of raw names, dropping blanks and duplicates.
    ///
    /// Order of first appearance is kept. Blank pieces (e.g. from a trailing
    /// comma in `--tags a,b,`) are skipped rather than rejected.
    pub fn parse_all<'a, I>(raw: I) -> Result<Vec<Self>, ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut tags: Vec<Self> = Vec::new();
        for piece in raw {
            if piece.trim().is_empty() {
                continue;
            }
            let tag = Self::new(piece)?;
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        Ok(tags)
    }

    /// Get the tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag with the number of entries referencing it
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TagUsage {
    pub name: String,
    pub usage_count: i64,
}

/// Sort order for tag listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagOrder {
    /// Most used first, ties broken by name
    #[default]
    Usage,
    /// Alphabetical
    Name,
}
