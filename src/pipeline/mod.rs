// src/pipeline/mod.rs

//! Per-category build work.
//!
//! - [`category`] defines the closed set of asset categories.
//! - [`scan`] turns a source glob into a concrete file list.
//! - [`transform`] runs the external per-file transform (or a plain copy).
//! - [`assets`] is the build action shared by all `build:*` tasks.
//! - [`clean`], [`lint`] and [`notes`] back the `clean`, `lint` and `todo`
//!   tasks.

pub mod assets;
pub mod category;
pub mod clean;
pub mod lint;
pub mod notes;
pub mod scan;
pub mod transform;

pub use assets::build_category;
pub use category::AssetCategory;
pub use transform::Transform;
