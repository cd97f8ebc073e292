//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod entry;
pub mod tag;
pub mod filter;

pub use validation::ValidationError;
pub use entry::{Entry, EntryType, NewEntry, DEFAULT_CREATED_BY, DEFAULT_ENTRY_TYPE};
pub use tag::{TagName, TagOrder, TagUsage};
pub use filter::{EntryFilter, Page, SearchQuery};
