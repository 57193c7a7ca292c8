// src/config/mod.rs

//! Configuration loading and validation for sitepipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate invariants like path-table completeness and disjoint output
//!   directories (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    CategoryPaths, CleanSection, ConfigFile, LintSection, PathTable, ServeSection,
    TransformCommand, TransformTable,
};
pub use validate::validate_config;
