//! Filter and pagination types for listing and searching entries

use super::{EntryType, TagName, ValidationError};

/// Upper bound on rows a single listing may return
pub const MAX_LIMIT: u32 = 1000;

/// Row window for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    /// Maximum rows to return (`None` = no cap)
    pub limit: Option<u32>,
    /// Rows to skip
    pub offset: u32,
}

impl Page {
    /// Create a page. A limit is clamped to `1..=MAX_LIMIT`.
    pub fn new(limit: Option<u32>, offset: u32) -> Self {
        Self {
            limit: limit.map(|l| l.clamp(1, MAX_LIMIT)),
            offset,
        }
    }

    /// First `limit` rows.
    pub fn first(limit: u32) -> Self {
        Self::new(Some(limit), 0)
    }
}

/// Tag, type, and page restrictions shared by list and search.
///
/// Several tags combine with AND: an entry must carry every one of them.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub tags: Vec<TagName>,
    pub entry_type: Option<EntryType>,
    pub page: Page,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: TagName) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = TagName>) -> Self {
        for tag in tags {
            self = self.tag(tag);
        }
        self
    }

    pub fn entry_type(mut self, entry_type: Option<EntryType>) -> Self {
        self.entry_type = entry_type;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }
}

/// Case-insensitive substring search over title and/or content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    pub in_title: bool,
    pub in_content: bool,
}

impl SearchQuery {
    /// Search both title and content for `text`.
    ///
    /// The text is matched literally; it is not trimmed, only checked for
    /// being non-blank.
    pub fn new(text: &str) -> Result<Self, ValidationError> {
        if text.trim().is_empty() {
            return Err(ValidationError::Empty {
                field: "search query",
            });
        }
        Ok(Self {
            text: text.to_owned(),
            in_title: true,
            in_content: true,
        })
    }

    pub fn in_title(mut self, yes: bool) -> Self {
        self.in_title = yes;
        self
    }

    pub fn in_content(mut self, yes: bool) -> Self {
        self.in_content = yes;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True when at least one column is searched.
    pub fn has_targets(&self) -> bool {
        self.in_title || self.in_content
    }

    /// `ILIKE` pattern matching the text as a literal substring.
    pub fn like_pattern(&self) -> String {
        format!("%{}%", escape_like(&self.text))
    }
}

/// Escape `LIKE` metacharacters using the default `\` escape.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
