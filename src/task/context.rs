// src/task/context.rs

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use crate::config::model::ConfigFile;
use crate::freshness::ChangeFilter;
use crate::serve::reload::ReloadHub;
use crate::task::orchestrator::Orchestrator;
use crate::watch::dispatcher::WatcherHandle;

/// Shared state handed to every task action.
///
/// Constructed once at process start and passed by reference; there is no
/// global mutable registry. The orchestrator is wired in after construction
/// (the `watch` task needs it to re-run tasks, but the orchestrator owns the
/// registry that owns the actions).
pub struct TaskContext {
    root: PathBuf,
    config: ConfigFile,
    filter: ChangeFilter,
    reload: ReloadHub,
    live: AtomicBool,
    orchestrator: OnceLock<Arc<Orchestrator>>,
    watcher: Mutex<Option<WatcherHandle>>,
}

impl TaskContext {
    pub fn new(root: PathBuf, config: ConfigFile, filter: ChangeFilter) -> Self {
        Self {
            root,
            config,
            filter,
            reload: ReloadHub::new(),
            live: AtomicBool::new(false),
            orchestrator: OnceLock::new(),
            watcher: Mutex::new(None),
        }
    }

    /// Project root: the directory containing the config file.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn filter(&self) -> &ChangeFilter {
        &self.filter
    }

    pub fn reload(&self) -> &ReloadHub {
        &self.reload
    }

    /// True while a serve/watch session is active. Lint downgrades
    /// violations to warnings in that state.
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Relaxed)
    }

    pub fn mark_live(&self) {
        self.live.store(true, Ordering::Relaxed);
    }

    /// Wire in the orchestrator once it exists. Later calls are ignored.
    pub fn wire_orchestrator(&self, orchestrator: Arc<Orchestrator>) {
        let _ = self.orchestrator.set(orchestrator);
    }

    pub fn orchestrator(&self) -> Option<Arc<Orchestrator>> {
        self.orchestrator.get().cloned()
    }

    /// Keep the filesystem watcher alive for the rest of the process;
    /// dropping the handle would stop watching.
    pub fn hold_watcher(&self, handle: WatcherHandle) {
        *self.watcher.lock().expect("watcher slot poisoned") = Some(handle);
    }
}
