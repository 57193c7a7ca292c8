// src/pipeline/category.rs

use std::fmt;
use std::path::{Path, PathBuf};

/// Closed set of asset categories the pipeline knows about.
///
/// Each category owns exactly one source glob, one watch glob and one output
/// directory (see [`crate::config::PathTable`]), plus one build task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetCategory {
    Markup,
    Script,
    Style,
    Image,
    Font,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 5] = [
        AssetCategory::Markup,
        AssetCategory::Script,
        AssetCategory::Style,
        AssetCategory::Image,
        AssetCategory::Font,
    ];

    /// Short lowercase name, used in config keys and log fields.
    pub fn name(self) -> &'static str {
        match self {
            AssetCategory::Markup => "markup",
            AssetCategory::Script => "script",
            AssetCategory::Style => "style",
            AssetCategory::Image => "image",
            AssetCategory::Font => "font",
        }
    }

    /// Name of the build task that owns this category.
    pub fn task_name(self) -> &'static str {
        match self {
            AssetCategory::Markup => "build:html",
            AssetCategory::Script => "build:js",
            AssetCategory::Style => "build:styles",
            AssetCategory::Image => "build:img",
            AssetCategory::Font => "build:fonts",
        }
    }

    /// Map a source-relative path to its output-relative path.
    ///
    /// The transform decides the content; the category decides the name:
    /// markup sources become `.html`, style sources become `.css`, everything
    /// else keeps its extension.
    pub fn output_rel_path(self, rel: &Path) -> PathBuf {
        match self {
            AssetCategory::Markup => rel.with_extension("html"),
            AssetCategory::Style => rel.with_extension("css"),
            AssetCategory::Script | AssetCategory::Image | AssetCategory::Font => {
                rel.to_path_buf()
            }
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_and_style_outputs_are_renamed() {
        let rel = Path::new("pages/index.pug");
        assert_eq!(
            AssetCategory::Markup.output_rel_path(rel),
            PathBuf::from("pages/index.html")
        );

        let rel = Path::new("app.scss");
        assert_eq!(
            AssetCategory::Style.output_rel_path(rel),
            PathBuf::from("app.css")
        );
    }

    #[test]
    fn other_categories_keep_their_extension() {
        let rel = Path::new("icons/logo.svg");
        assert_eq!(AssetCategory::Image.output_rel_path(rel), rel.to_path_buf());

        let rel = Path::new("app.js");
        assert_eq!(AssetCategory::Script.output_rel_path(rel), rel.to_path_buf());
    }
}
