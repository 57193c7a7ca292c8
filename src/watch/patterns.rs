// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::config::model::ConfigFile;
use crate::pipeline::category::AssetCategory;

/// Compiled watch glob for one asset category, bound to the tasks that must
/// re-run when a matching file changes.
///
/// Built once at startup from the path table; never mutated afterwards.
#[derive(Clone)]
pub struct WatchBinding {
    category: AssetCategory,
    tasks: Vec<String>,
    glob: GlobSet,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("category", &self.category)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

impl WatchBinding {
    pub fn category(&self) -> AssetCategory {
        self.category
    }

    /// Task names re-run when this binding matches.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Returns true if the binding is interested in the given path
    /// (relative to the project root, forward slashes).
    pub fn matches(&self, rel_path: &str) -> bool {
        self.glob.is_match(rel_path)
    }
}

/// Build one binding per category from the path table's flat watch patterns.
pub fn build_watch_bindings(config: &ConfigFile) -> Result<Vec<WatchBinding>> {
    let mut bindings = Vec::with_capacity(AssetCategory::ALL.len());

    for (category, paths) in config.paths.iter() {
        let glob = build_globset(&paths.watch)
            .with_context(|| format!("building watch globset for [paths.{category}]"))?;

        bindings.push(WatchBinding {
            category,
            tasks: vec![category.task_name().to_string()],
            glob,
        });
    }

    Ok(bindings)
}

fn build_globset(pattern: &str) -> Result<GlobSet> {
    // Same semantics as source scanning: `*` stops at `/`, only `**` descends.
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut builder = GlobSetBuilder::new();
    builder.add(glob);
    Ok(builder.build()?)
}
