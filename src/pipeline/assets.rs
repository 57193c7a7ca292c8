// src/pipeline/assets.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::pipeline::category::AssetCategory;
use crate::pipeline::scan;
use crate::pipeline::transform::Transform;
use crate::task::context::TaskContext;

/// Build one asset category: scan its source glob, transform every file,
/// and write outputs that the change filter lets through.
///
/// Files within the category are processed concurrently; ordering between
/// categories is the orchestrator's concern.
pub async fn build_category(ctx: Arc<TaskContext>, category: AssetCategory) -> Result<()> {
    let paths = ctx.config().paths.get(category).clone();
    let transform = Transform::from_config(ctx.config().transform.get(category));

    let sources = scan::scan_sources(ctx.root(), &paths.src)?;
    if sources.is_empty() {
        info!(category = %category, glob = %paths.src, "no sources matched");
        return Ok(());
    }

    let base = ctx.root().join(scan::glob_base(&paths.src));
    let dest = ctx.root().join(&paths.dest);
    tokio::fs::create_dir_all(&dest)
        .await
        .with_context(|| format!("creating output directory {:?}", dest))?;

    let mut join = JoinSet::new();
    for source in sources {
        let ctx = Arc::clone(&ctx);
        let transform = transform.clone();
        let base = base.clone();
        let dest = dest.clone();

        join.spawn(async move {
            process_file(&ctx, category, &transform, &base, &dest, source).await
        });
    }

    let mut written = 0usize;
    let mut skipped = 0usize;
    while let Some(joined) = join.join_next().await {
        let wrote = joined.context("per-file build task panicked")??;
        if wrote {
            written += 1;
        } else {
            skipped += 1;
        }
    }

    ctx.filter().persist()?;

    info!(
        category = %category,
        written,
        unchanged = skipped,
        "category build finished"
    );
    Ok(())
}

/// Transform a single source file and write it out unless unchanged.
///
/// Returns `true` if the output was (re)written.
async fn process_file(
    ctx: &TaskContext,
    category: AssetCategory,
    transform: &Transform,
    base: &PathBuf,
    dest: &PathBuf,
    source: PathBuf,
) -> Result<bool> {
    let bytes = transform.apply(&source).await?;

    let rel = source
        .strip_prefix(base)
        .with_context(|| format!("source {:?} is outside glob base {:?}", source, base))?;
    let output = dest.join(category.output_rel_path(rel));

    if !ctx.filter().should_write(&output, &bytes) {
        debug!(output = %output.display(), "unchanged, skipping write");
        return Ok(false);
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("writing output {:?}", output))?;

    debug!(output = %output.display(), bytes = bytes.len(), "wrote output");
    Ok(true)
}
