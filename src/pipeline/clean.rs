// src/pipeline/clean.rs

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::task::context::TaskContext;

/// Remove all build output, the freshness ledger, and any configured extra
/// cache paths. Already-absent targets are fine; only a real filesystem error
/// (e.g. permissions) fails the task.
pub async fn clean(ctx: Arc<TaskContext>) -> Result<()> {
    let mut targets: BTreeSet<PathBuf> = ctx
        .config()
        .paths
        .iter()
        .map(|(_, paths)| ctx.root().join(&paths.dest))
        .collect();

    for extra in &ctx.config().clean.extra {
        targets.insert(ctx.root().join(extra));
    }

    for target in targets {
        remove_tree(&target)?;
    }

    remove_file_if_present(ctx.filter().ledger_path())?;
    if let Some(state_dir) = ctx.filter().ledger_path().parent() {
        // Drop the state directory too if the ledger was its only content.
        let _ = std::fs::remove_dir(state_dir);
    }
    ctx.filter().clear();

    info!("clean finished");
    Ok(())
}

fn remove_tree(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("removing {:?}", path)),
    }
}

fn remove_file_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("removing {:?}", path)),
    }
}
