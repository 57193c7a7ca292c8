// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod freshness;
pub mod logging;
pub mod pipeline;
pub mod serve;
pub mod task;
pub mod tasks;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::freshness::{ChangeFilter, LEDGER_PATH};
use crate::task::orchestrator::Orchestrator;
use crate::task::registry::TaskRegistry;
use crate::task::context::TaskContext;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - task registry / orchestrator
/// - the change filter's freshness ledger
/// - the requested task run
/// - Ctrl-C handling for persistent (serve/watch) invocations
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let mut registry = TaskRegistry::new();
    tasks::register_builtin(&mut registry)?;
    registry.validate()?;

    if args.list {
        print_task_list(&registry);
        return Ok(());
    }

    let orchestrator = Arc::new(Orchestrator::new(registry));

    // Resolve the plan up front: unknown task names and cycles fail here,
    // before any filesystem work.
    let plan = orchestrator.plan(&args.task)?;
    let persistent = plan.iter().any(|t| t == "serve" || t == "watch");

    let root = project_root(&config_path);
    let filter = ChangeFilter::load(root.join(LEDGER_PATH))?;

    let ctx = Arc::new(TaskContext::new(root, cfg, filter));
    ctx.wire_orchestrator(Arc::clone(&orchestrator));
    if persistent {
        // Lint downgrades violations to warnings for the whole live session,
        // including the initial build.
        ctx.mark_live();
    }

    orchestrator.run(&args.task, Arc::clone(&ctx)).await?;

    if persistent {
        tokio::signal::ctrl_c()
            .await
            .context("listening for Ctrl+C")?;
        info!("shutdown requested");
    }

    Ok(())
}

/// Project root for all relative paths: the directory containing the config
/// file, or `.`.
fn project_root(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `--list` output: registered tasks with their prerequisites.
fn print_task_list(registry: &TaskRegistry) {
    println!("sitepipe tasks:");
    for name in registry.names() {
        let task = match registry.resolve(name) {
            Ok(task) => task,
            Err(_) => continue,
        };
        if task.prerequisites().is_empty() {
            println!("  - {name}");
        } else {
            println!("  - {name} (after: {})", task.prerequisites().join(", "));
        }
    }
}
