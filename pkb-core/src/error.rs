//! Structured error types for pkb-core.
//!
//! Uses `thiserror` so callers can match on the failure class.
//! The binary crate (pkb-cli) wraps these in `anyhow` for context and maps
//! them to exit codes through [`Error::exit_code`].

use std::path::PathBuf;
use thiserror::Error;

use crate::models::ValidationError;

/// Main error type for pkb-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid environment variable / settings file
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// User input rejected before reaching the database
    #[error("invalid input")]
    Validation(#[from] ValidationError),

    /// Network or authentication failure while opening the pool
    #[error("could not connect to database")]
    Connection(#[source] sqlx::Error),

    /// Lookup found nothing
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Any other driver error
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

/// Result type alias for pkb-core operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a not-found error
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// Process exit code for this failure class.
    ///
    /// 1: validation / not found, 2: configuration, 3: connection / database.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::NotFound { .. } => 1,
            Self::Config(_) => 2,
            Self::Connection(_) | Self::Database(_) => 3,
        }
    }
}

/// Configuration failures, reported before any connection attempt
#[derive(Error, Debug)]
pub enum ConfigError {
    /// One or more required variables are unset or blank
    #[error("missing required environment variable(s): {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid port '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    #[error("invalid sslmode '{0}': expected disable, allow, prefer, require, verify-ca or verify-full")]
    InvalidSslMode(String),

    #[error("failed to read settings file {path:?}")]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path:?}")]
    ParseSettings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = Error::not_found("entry", "Nonexistent Title");
        assert_eq!(err.to_string(), "not found: entry 'Nonexistent Title'");

        let err = ConfigError::Missing(vec!["user", "port"]);
        assert_eq!(
            err.to_string(),
            "missing required environment variable(s): user, port"
        );
    }

    #[test]
    fn test_source_chain() {
        let err: Error = ValidationError::Empty { field: "title" }.into();
        assert_eq!(err.to_string(), "invalid input");
        assert_eq!(
            err.source().map(ToString::to_string).as_deref(),
            Some("title cannot be empty")
        );
    }

    #[test]
    fn test_exit_codes() {
        let validation: Error = ValidationError::Empty { field: "title" }.into();
        assert_eq!(validation.exit_code(), 1);
        assert_eq!(Error::not_found("entry", "x").exit_code(), 1);

        let config: Error = ConfigError::InvalidPort("abc".into()).into();
        assert_eq!(config.exit_code(), 2);

        assert_eq!(Error::Connection(sqlx::Error::PoolTimedOut).exit_code(), 3);
        assert_eq!(Error::Database(sqlx::Error::RowNotFound).exit_code(), 3);
    }
}
