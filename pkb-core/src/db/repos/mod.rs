//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Filters composed with bound parameters, never string interpolation of input
//! - Handles conflicts via ON CONFLICT (no check-then-insert)
//! - Uses transactions for multi-step operations

pub mod entries;
pub mod tags;

pub use entries::EntryRepo;
pub use tags::TagRepo;
