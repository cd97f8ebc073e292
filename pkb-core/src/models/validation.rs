//! Validation error types

use std::fmt;

/// Validation error for user-supplied entry, tag, and query input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty (or whitespace only) when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Value doesn't match the required format
    InvalidFormat {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat {
                field,
                value,
                reason,
            } => {
                write!(f, "invalid {} '{}': {}", field, value, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Trim `raw` and check it is non-empty and at most `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    raw: &str,
    max: Option<usize>,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if let Some(max) = max {
        if trimmed.chars().count() > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 512,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 512 characters"
        );

        let err = ValidationError::Empty { field: "content" };
        assert_eq!(err.to_string(), "content cannot be empty");

        let err = ValidationError::InvalidFormat {
            field: "tag name",
            value: "a b".into(),
            reason: "must not contain whitespace",
        };
        assert_eq!(
            err.to_string(),
            "invalid tag name 'a b': must not contain whitespace"
        );
    }

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("title", "  hi  ", None).unwrap(), "hi");
    }

    #[test]
    fn required_text_rejects_whitespace_only() {
        let err = required_text("content", " \n\t ", None).unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "content" });
    }

    #[test]
    fn required_text_counts_chars_not_bytes() {
        // 4 chars, 7 bytes
        assert!(required_text("title", "ünïç", Some(4)).is_ok());
        assert!(required_text("title", "ünïçö", Some(4)).is_err());
    }
}
