// src/logging.rs

//! Tracing setup.
//!
//! The `--log-level` flag takes precedence and sets a plain global level.
//! Without it, `SITEPIPE_LOG` may carry a full filter directive (for example
//! `sitepipe=debug,notify=warn` to keep the watcher backend quiet), and with
//! neither set the pipeline logs at `info`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

const ENV_VAR: &str = "SITEPIPE_LOG";

/// Install the global subscriber. Call once, before any task runs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::new(level.as_directive()),
        None => EnvFilter::try_from_env(ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}
