//! Entry records and validated input for creating them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::required_text;
use super::{TagName, ValidationError};

/// Maximum length for entry titles
const MAX_TITLE_LEN: usize = 512;

/// Maximum length for entry types
const MAX_TYPE_LEN: usize = 64;

/// Maximum length for the creator label
const MAX_CREATED_BY_LEN: usize = 128;

/// Type assigned when none is given
pub const DEFAULT_ENTRY_TYPE: &str = "note";

/// Creator label assigned when none is given
pub const DEFAULT_CREATED_BY: &str = "user";

/// Entry record as read back from the database, with its tag names
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Entry {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub entry_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    /// Sorted tag names
    pub tags: Vec<String>,
}

/// Validated entry type (free-form label such as `note`, `idea`, `research`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryType(String);

impl EntryType {
    /// Create an entry type. Surrounding whitespace is trimmed; inner
    /// whitespace is rejected so types stay usable as `--type` filters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let value = required_text("entry type", s, Some(MAX_TYPE_LEN))?;
        if value.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "entry type",
                value,
                reason: "must not contain whitespace",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryType {
    fn default() -> Self {
        Self(DEFAULT_ENTRY_TYPE.to_owned())
    }
}

impl AsRef<str> for EntryType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated input for a new entry.
///
/// Construction checks every field, so a `NewEntry` that exists can be
/// inserted without further validation.
///
/// # Example
/// ```
/// use pkb_core::models::{EntryType, NewEntry, TagName};
///
/// let entry = NewEntry::new("Borrow checker", "Notes on lifetimes")
///     .unwrap()
///     .with_type(EntryType::new("research").unwrap())
///     .with_tags(TagName::parse_all(["Rust", "rust", "lifetimes"]).unwrap());
///
/// assert_eq!(entry.entry_type().as_str(), "research");
/// assert_eq!(entry.tags().len(), 2);
/// assert!(NewEntry::new("", "content").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct NewEntry {
    title: String,
    content: String,
    entry_type: EntryType,
    created_by: String,
    tags: Vec<TagName>,
}

impl NewEntry {
    /// Validate title and content. Type and creator take their defaults.
    pub fn new(title: &str, content: &str) -> Result<Self, ValidationError> {
        let title = required_text("title", title, Some(MAX_TITLE_LEN))?;
        // Content keeps its inner formatting; only emptiness is checked.
        if content.trim().is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }

        Ok(Self {
            title,
            content: content.to_owned(),
            entry_type: EntryType::default(),
            created_by: DEFAULT_CREATED_BY.to_owned(),
            tags: Vec::new(),
        })
    }

    pub fn with_type(mut self, entry_type: EntryType) -> Self {
        self.entry_type = entry_type;
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagName>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the creator label.
    pub fn with_created_by(mut self, created_by: &str) -> Result<Self, ValidationError> {
        self.created_by = required_text("creator", created_by, Some(MAX_CREATED_BY_LEN))?;
        Ok(self)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn entry_type(&self) -> &EntryType {
        &self.entry_type
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn tags(&self) -> &[TagName] {
        &self.tags
    }
}
