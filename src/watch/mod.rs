// src/watch/mod.rs

//! File watching and change dispatch.
//!
//! This module is responsible for:
//! - Compiling the per-category watch globs into [`patterns::WatchBinding`]s.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing change bursts and re-running the bound tasks.
//!
//! It does **not** know how tasks do their work; it only turns filesystem
//! changes into task re-runs and reload notifications.

pub mod dispatcher;
pub mod patterns;

pub use dispatcher::{spawn_dispatcher, WatcherHandle};
pub use patterns::{build_watch_bindings, WatchBinding};
