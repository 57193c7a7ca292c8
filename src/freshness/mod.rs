// src/freshness/mod.rs

//! Content-hash change detection for build outputs.
//!
//! The [`ChangeFilter`] suppresses writes whose blake3 digest matches the
//! digest last recorded for that output path, so an unchanged source tree
//! produces zero rewrites. Digests persist in a line-oriented ledger under
//! `.sitepipe/` so a restarted process keeps its incremental state; `clean`
//! removes the ledger along with the outputs.

pub mod ledger;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tracing::debug;

pub use ledger::{load_ledger, save_ledger};

/// Ledger location, relative to the project root.
pub const LEDGER_PATH: &str = ".sitepipe/ledger";

/// Per-output-path digest store with write suppression.
///
/// Shared across tasks; interior mutability so per-file work inside one task
/// can run concurrently.
pub struct ChangeFilter {
    ledger_path: PathBuf,
    entries: Mutex<HashMap<PathBuf, String>>,
}

impl ChangeFilter {
    /// Load the filter, seeding it from the on-disk ledger if one exists.
    pub fn load(ledger_path: impl Into<PathBuf>) -> Result<Self> {
        let ledger_path = ledger_path.into();
        let entries = ledger::load_ledger(&ledger_path)?;
        if !entries.is_empty() {
            debug!(entries = entries.len(), "loaded freshness ledger");
        }
        Ok(Self {
            ledger_path,
            entries: Mutex::new(entries),
        })
    }

    /// Decide whether `bytes` should be written to `output`.
    ///
    /// Returns `false` iff the digest of `bytes` equals the digest last
    /// recorded for `output`. Otherwise records the new digest and returns
    /// `true`. A path never seen before always returns `true`.
    pub fn should_write(&self, output: &Path, bytes: &[u8]) -> bool {
        let digest = blake3::hash(bytes).to_hex().to_string();

        let mut entries = self.entries.lock().expect("freshness ledger poisoned");
        match entries.get(output) {
            Some(prev) if *prev == digest => false,
            _ => {
                entries.insert(output.to_path_buf(), digest);
                true
            }
        }
    }

    /// Write the in-memory digests back to the ledger file.
    ///
    /// Called at the end of each build task rather than per file, so a burst
    /// of writes costs one ledger rewrite.
    pub fn persist(&self) -> Result<()> {
        let entries = self.entries.lock().expect("freshness ledger poisoned");
        ledger::save_ledger(&self.ledger_path, &entries)
    }

    /// Forget all recorded digests (used by `clean`; the ledger file itself
    /// is removed separately).
    pub fn clear(&self) {
        self.entries.lock().expect("freshness ledger poisoned").clear();
    }

    /// Path of the backing ledger file.
    pub fn ledger_path(&self) -> &Path {
        &self.ledger_path
    }
}
