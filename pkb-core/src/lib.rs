//! pkb-core: personal knowledge base storage
//!
//! Tagged text entries kept in PostgreSQL across three tables
//! (`entries`, `tags`, `entry_tags`), with a query layer that composes
//! tag, type, text, and pagination filters.

pub mod config;
pub mod db;
pub mod error;
pub mod models;

pub use config::{DbConfig, Settings};
pub use db::{EntryRepo, PgPool, TagRepo};
pub use error::{ConfigError, Error, Result};
pub use models::{Entry, EntryFilter, EntryType, NewEntry, Page, SearchQuery, TagName, TagOrder, TagUsage};
