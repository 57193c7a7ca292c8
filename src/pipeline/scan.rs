// src/pipeline/scan.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobBuilder;
use jwalk::WalkDir;
use tracing::debug;

/// Collect all files under `root` whose root-relative path matches `pattern`.
///
/// Patterns use `/` separators and are matched with a literal separator, so
/// `pages/*.pug` does not descend into subdirectories while `img/**/*` does.
/// Results are sorted for deterministic processing order.
pub fn scan_sources(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .with_context(|| format!("invalid source glob: {pattern}"))?
        .compile_matcher();

    let mut out = Vec::new();

    for entry in WalkDir::new(root).skip_hidden(false) {
        let entry = entry.with_context(|| format!("walking source tree under {:?}", root))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(rel) = relative_str(root, &path) else {
            continue;
        };
        if matcher.is_match(&rel) {
            out.push(path);
        }
    }

    out.sort();
    debug!(pattern, matched = out.len(), "scanned sources");
    Ok(out)
}

/// Literal directory prefix of a glob: everything before the first component
/// containing a meta character.
///
/// `src/img/**/*` -> `src/img`, `src/pug/pages/*.pug` -> `src/pug/pages`,
/// `src/js/app.js` -> `src/js`. Output paths preserve the source layout below
/// this base.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in pattern.split('/') {
        if component.contains(['*', '?', '[', '{']) {
            break;
        }
        base.push(component);
    }
    // A concrete file pattern contributes its directory, not the file itself.
    if base.as_os_str() == pattern {
        base.pop();
    }
    base
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    Some(rel.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn glob_base_stops_at_first_meta_component() {
        assert_eq!(glob_base("src/img/**/*"), PathBuf::from("src/img"));
        assert_eq!(glob_base("src/pug/pages/*.pug"), PathBuf::from("src/pug/pages"));
        assert_eq!(glob_base("src/js/app.js"), PathBuf::from("src/js"));
    }

    #[test]
    fn scan_respects_literal_separator() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("pages/sub"))?;
        fs::write(dir.path().join("pages/index.pug"), "p hi")?;
        fs::write(dir.path().join("pages/sub/deep.pug"), "p deep")?;

        let flat = scan_sources(dir.path(), "pages/*.pug")?;
        assert_eq!(flat.len(), 1);
        assert!(flat[0].ends_with("pages/index.pug"));

        let deep = scan_sources(dir.path(), "pages/**/*.pug")?;
        assert_eq!(deep.len(), 2);
        Ok(())
    }
}
