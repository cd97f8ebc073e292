//! Database layer - connection pool, schema, and repositories
//!
//! # Design Principles
//!
//! - Small connection pool; the pool itself is the scoped handle
//! - Entry listings load tags in the same statement - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-step operations

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{create_pool, ping};
pub use repos::*;
pub use sqlx::PgPool;
