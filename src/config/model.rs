// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::pipeline::category::AssetCategory;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [paths.markup]
/// src = "src/pug/pages/*.pug"
/// watch = "src/pug/**/*"
/// dest = "build/"
///
/// [transform.markup]
/// cmd = "pug --pretty"
///
/// [serve]
/// port = 9000
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Source/watch/output path table, one entry per asset category.
    pub paths: PathTable,

    /// Optional per-category transform commands from `[transform.<category>]`.
    #[serde(default)]
    pub transform: TransformTable,

    /// Optional `[lint]` section.
    #[serde(default)]
    pub lint: Option<LintSection>,

    /// Dev server options from `[serve]`.
    #[serde(default)]
    pub serve: ServeSection,

    /// Extra paths removed by `clean`, from `[clean]`.
    #[serde(default)]
    pub clean: CleanSection,
}

/// `[paths]`: the static mapping from asset categories to their source glob,
/// watch glob and output directory. Immutable after load.
///
/// Watch patterns are flat, one per category; there are no nested per-bundle
/// sub-patterns.
#[derive(Debug, Clone, Deserialize)]
pub struct PathTable {
    pub markup: CategoryPaths,
    pub script: CategoryPaths,
    pub style: CategoryPaths,
    pub image: CategoryPaths,
    pub font: CategoryPaths,
}

impl PathTable {
    pub fn get(&self, category: AssetCategory) -> &CategoryPaths {
        match category {
            AssetCategory::Markup => &self.markup,
            AssetCategory::Script => &self.script,
            AssetCategory::Style => &self.style,
            AssetCategory::Image => &self.image,
            AssetCategory::Font => &self.font,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetCategory, &CategoryPaths)> {
        AssetCategory::ALL.iter().map(move |&c| (c, self.get(c)))
    }
}

/// `[paths.<category>]`: one row of the path table.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPaths {
    /// Glob selecting the source files fed into the category's transform.
    pub src: String,

    /// Glob selecting the files whose changes re-trigger the category's task.
    ///
    /// Usually broader than `src` (e.g. partials and includes that are never
    /// compiled on their own but affect the output).
    pub watch: String,

    /// Output directory, relative to the project root.
    pub dest: PathBuf,
}

/// `[transform.<category>]` sections, one optional command per category.
///
/// A category without a transform copies sources byte for byte (fonts and
/// images typically rely on this).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransformTable {
    #[serde(default)]
    pub markup: Option<TransformCommand>,
    #[serde(default)]
    pub script: Option<TransformCommand>,
    #[serde(default)]
    pub style: Option<TransformCommand>,
    #[serde(default)]
    pub image: Option<TransformCommand>,
    #[serde(default)]
    pub font: Option<TransformCommand>,
}

impl TransformTable {
    pub fn get(&self, category: AssetCategory) -> Option<&TransformCommand> {
        match category {
            AssetCategory::Markup => self.markup.as_ref(),
            AssetCategory::Script => self.script.as_ref(),
            AssetCategory::Style => self.style.as_ref(),
            AssetCategory::Image => self.image.as_ref(),
            AssetCategory::Font => self.font.as_ref(),
        }
    }
}

/// A transform is an external command run once per source file.
///
/// Contract: the source bytes are piped to stdin, the transformed output is
/// read from stdout, and a non-zero exit fails the file. The source path is
/// exported as `SITEPIPE_SRC_PATH` for tools that resolve relative includes.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformCommand {
    pub cmd: String,
}

/// `[lint]`: command run over script sources by the `lint` task.
///
/// The command encodes its own file selection (e.g. `eslint 'src/js/**/*.js'`)
/// and is run from the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct LintSection {
    pub cmd: String,
}

/// `[serve]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeSection {
    /// Directories served by the HTTP server, relative to the project root.
    #[serde(default = "default_serve_dirs")]
    pub dirs: Vec<PathBuf>,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the live-reload WebSocket hub.
    #[serde(default = "default_ws_port")]
    pub ws_port: u16,

    /// Push a reload to already-connected clients when the server starts.
    #[serde(default)]
    pub notify_on_start: bool,
}

fn default_serve_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("build")]
}

fn default_port() -> u16 {
    9000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_ws_port() -> u16 {
    35729
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            dirs: default_serve_dirs(),
            port: default_port(),
            host: default_host(),
            ws_port: default_ws_port(),
            notify_on_start: false,
        }
    }
}

/// `[clean]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CleanSection {
    /// Paths removed in addition to the output directories and the freshness
    /// ledger (e.g. an image optimizer's disk cache).
    #[serde(default)]
    pub extra: Vec<PathBuf>,
}
