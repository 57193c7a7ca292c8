// src/pipeline/lint.rs

use std::process::Stdio;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::task::context::TaskContext;

/// Run the configured lint command over the script sources.
///
/// Standalone, a lint violation is a hard failure. While a live serve/watch
/// session is active it is reported as a warning instead, so a typo in one
/// file does not tear down the whole watch process.
pub async fn lint(ctx: Arc<TaskContext>) -> Result<()> {
    let Some(lint) = &ctx.config().lint else {
        debug!("no [lint] section configured; skipping");
        return Ok(());
    };

    info!(cmd = %lint.cmd, "linting");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(&lint.cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(&lint.cmd);
        c
    };

    let output = command
        .current_dir(ctx.root())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("running lint command '{}'", lint.cmd))?;

    if output.status.success() {
        debug!("lint passed");
        return Ok(());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let report = format!("{}{}", stdout.trim(), stderr.trim());

    if ctx.is_live() {
        warn!(
            exit_code = output.status.code().unwrap_or(-1),
            "lint violations (live session active, not failing): {report}"
        );
        return Ok(());
    }

    bail!(
        "lint failed (exit code {}): {report}",
        output.status.code().unwrap_or(-1)
    );
}
