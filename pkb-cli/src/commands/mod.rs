//! Command implementations for the pkb CLI

pub mod db;
pub mod entries;
pub mod tags;

use anyhow::Result;
use pkb_core::db::create_pool;
use pkb_core::{DbConfig, PgPool};
use tracing::debug;

use crate::ui;

// Re-export dispatcher functions for flat access from main.rs
pub use db::{run_check_db, run_init_db};
pub use entries::{run_add_entry, run_list_entries, run_search, run_show};
pub use tags::run_list_tags;

/// Resolve connection settings from the environment and open the pool.
///
/// Configuration problems surface before any network activity.
pub(crate) async fn connect() -> Result<PgPool> {
    let config = DbConfig::from_env().map_err(pkb_core::Error::from)?;
    debug!(?config, "resolved database configuration");

    let pb = ui::spinner(format!("Connecting to {}...", config.host));
    match create_pool(&config).await {
        Ok(pool) => {
            ui::finish_clear(pb);
            Ok(pool)
        }
        Err(err) => {
            ui::finish_error(pb, "connection failed");
            Err(err.into())
        }
    }
}
