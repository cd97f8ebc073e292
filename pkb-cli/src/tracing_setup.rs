//! Tracing setup for the pkb CLI
//!
//! Usage:
//!   pkb --debug ...            # Debug logging to stderr
//!   RUST_LOG=pkb_core=debug pkb  # Fine-grained log control
//!
//! Logs always go to stderr so stdout carries only command results.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Enable debug logging (used when RUST_LOG is not set)
    pub debug: bool,
}

impl TracingConfig {
    fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}

/// Initialize the console subscriber. RUST_LOG takes precedence over `--debug`.
pub fn init(config: &TracingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
