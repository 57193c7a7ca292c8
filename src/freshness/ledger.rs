// src/freshness/ledger.rs

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Load all recorded digests from the ledger file.
///
/// The file format is a simple line-based mapping:
///
/// ```text
/// <hex_digest> <output_path>
/// ```
///
/// The digest comes first because output paths may contain whitespace.
/// A missing file is treated as an empty ledger (first run).
pub fn load_ledger(path: &Path) -> Result<HashMap<PathBuf, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let file =
        File::open(path).with_context(|| format!("opening freshness ledger at {:?}", path))?;
    let reader = BufReader::new(file);

    let mut map = HashMap::new();

    for line_res in reader.lines() {
        let line = line_res?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some((digest, out_path)) = trimmed.split_once(char::is_whitespace) {
            map.insert(PathBuf::from(out_path.trim()), digest.to_string());
        }
    }

    Ok(map)
}

/// Persist all recorded digests to the ledger file, creating the parent
/// directory if needed.
pub fn save_ledger(path: &Path, map: &HashMap<PathBuf, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating ledger directory at {:?}", parent))?;
    }

    let file =
        File::create(path).with_context(|| format!("creating freshness ledger at {:?}", path))?;
    let mut writer = BufWriter::new(file);

    for (out_path, digest) in map.iter() {
        let path = out_path.display().to_string();
        // The line format cannot hold an embedded newline; such a path stays
        // unrecorded and its output is simply rewritten every run.
        if path.contains(['\n', '\r']) {
            debug!(path = %path, "path not representable in ledger, skipping");
            continue;
        }
        writeln!(writer, "{} {}", digest, path)?;
    }

    writer.flush()?;
    Ok(())
}
