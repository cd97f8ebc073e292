//! Database maintenance commands: init-db, check-db

use anyhow::Result;
use pkb_core::db::{ping, schema};
use tracing::info;

use crate::output::{self, Renderer};

/// Create tables and indexes. Safe to run repeatedly.
pub async fn run_init_db(renderer: Renderer) -> Result<()> {
    let pool = super::connect().await?;
    let result = schema::initialize(&pool).await;
    pool.close().await;
    result?;

    output::emit(&renderer.status("Database initialized")?)?;
    Ok(())
}

/// Verify that the configured database accepts queries.
pub async fn run_check_db(renderer: Renderer) -> Result<()> {
    let pool = super::connect().await?;
    let result = ping(&pool).await;
    pool.close().await;
    result?;

    info!("database reachable");
    output::emit(&renderer.status("Database connection OK")?)?;
    Ok(())
}
