// src/pipeline/transform.rs

use std::path::Path;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::model::TransformCommand;

/// How a category turns a source file into output bytes.
///
/// Transforms are external black boxes: the pipeline only knows the
/// stdin/stdout contract. A category without a configured command copies
/// bytes through unchanged.
#[derive(Debug, Clone)]
pub enum Transform {
    Copy,
    Command(String),
}

impl Transform {
    pub fn from_config(cfg: Option<&TransformCommand>) -> Self {
        match cfg {
            Some(tc) => Transform::Command(tc.cmd.clone()),
            None => Transform::Copy,
        }
    }

    /// Produce the output bytes for one source file.
    pub async fn apply(&self, source: &Path) -> Result<Vec<u8>> {
        match self {
            Transform::Copy => tokio::fs::read(source)
                .await
                .with_context(|| format!("reading source file {:?}", source)),
            Transform::Command(cmd) => run_transform(cmd, source).await,
        }
    }
}

/// Pipe the source file through a shell command and capture its stdout.
async fn run_transform(cmd: &str, source: &Path) -> Result<Vec<u8>> {
    debug!(cmd, source = %source.display(), "running transform");

    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .env("SITEPIPE_SRC_PATH", source)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning transform command '{cmd}'"))?;

    let bytes = tokio::fs::read(source)
        .await
        .with_context(|| format!("reading source file {:?}", source))?;

    let mut stdin = child
        .stdin
        .take()
        .context("transform child has no stdin handle")?;

    // Feed stdin concurrently; waiting serially can deadlock once the child
    // fills its stdout pipe.
    let feeder = tokio::spawn(async move {
        let res = stdin.write_all(&bytes).await;
        drop(stdin);
        res
    });

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for transform '{cmd}'"))?;

    // A child may exit without draining stdin (e.g. on its own error); the
    // exit status is the signal that matters, so feeder errors are only noise.
    if let Ok(Err(err)) = feeder.await {
        debug!(cmd, error = %err, "transform stdin feeder ended early");
    }

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "transform '{}' failed on {:?} (exit code {}): {}",
            cmd,
            source,
            output.status.code().unwrap_or(-1),
            stderr.trim()
        );
    }

    Ok(output.stdout)
}
