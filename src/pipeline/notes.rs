// src/pipeline/notes.rs

//! The `todo` task: scan the hand-written sources for annotation tags
//! (`NOTE`, `TODO`, `FIXME`) and report every hit with its location.
//!
//! Purely a reporting task; hits never fail the run.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::pipeline::category::AssetCategory;
use crate::pipeline::scan;
use crate::task::context::TaskContext;

const TAGS: [&str; 3] = ["NOTE", "TODO", "FIXME"];

/// Categories whose watch globs get scanned. Images and fonts are binary
/// and carry no annotations.
const SCANNED: [AssetCategory; 3] = [
    AssetCategory::Markup,
    AssetCategory::Script,
    AssetCategory::Style,
];

/// One annotation found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagHit {
    /// Root-relative source path.
    pub path: String,
    /// 1-based line number.
    pub line: usize,
    pub tag: &'static str,
    /// Text following the tag, colon stripped.
    pub text: String,
}

/// Task action: scan and log every hit, then a summary line.
pub async fn todo(ctx: Arc<TaskContext>) -> Result<()> {
    let hits = scan_tags(&ctx)?;

    for hit in &hits {
        info!("{}:{} [{}] {}", hit.path, hit.line, hit.tag, hit.text);
    }
    info!(hits = hits.len(), "annotation scan finished");
    Ok(())
}

/// Collect annotation hits across the markup, script and style watch globs.
pub fn scan_tags(ctx: &TaskContext) -> Result<Vec<TagHit>> {
    let mut hits = Vec::new();

    for category in SCANNED {
        let pattern = &ctx.config().paths.get(category).watch;
        for source in scan::scan_sources(ctx.root(), pattern)? {
            // Non-UTF-8 content under a text glob is not worth failing over.
            let Ok(contents) = std::fs::read_to_string(&source) else {
                continue;
            };
            let rel = scan::relative_str(ctx.root(), &source)
                .unwrap_or_else(|| source.display().to_string());
            collect_tags(&rel, &contents, &mut hits);
        }
    }

    Ok(hits)
}

/// Scan one file's contents, appending a hit for each tagged line.
///
/// Tags must stand alone as words: `TODO: fix` matches, `KEYNOTES` does not.
/// A line with several tags reports only the leftmost one.
pub fn collect_tags(path: &str, contents: &str, hits: &mut Vec<TagHit>) {
    for (idx, line) in contents.lines().enumerate() {
        let Some((tag, pos)) = find_tag(line) else {
            continue;
        };
        let text = line[pos + tag.len()..]
            .trim_start_matches(':')
            .trim()
            .to_string();
        hits.push(TagHit {
            path: path.to_string(),
            line: idx + 1,
            tag,
            text,
        });
    }
}

fn find_tag(line: &str) -> Option<(&'static str, usize)> {
    TAGS.iter()
        .filter_map(|&tag| {
            line.match_indices(tag)
                .find(|&(pos, _)| {
                    let bytes = line.as_bytes();
                    let before_ok =
                        pos == 0 || !bytes[pos - 1].is_ascii_alphanumeric();
                    let after_ok = !matches!(
                        bytes.get(pos + tag.len()),
                        Some(b) if b.is_ascii_alphanumeric()
                    );
                    before_ok && after_ok
                })
                .map(|(pos, _)| (tag, pos))
        })
        .min_by_key(|&(_, pos)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_found_with_locations_and_text() {
        let contents = "var x;\n// TODO: wire up the footer\n/* FIXME broken */\n";
        let mut hits = Vec::new();
        collect_tags("src/js/app.js", contents, &mut hits);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].line, 2);
        assert_eq!(hits[0].tag, "TODO");
        assert_eq!(hits[0].text, "wire up the footer");
        assert_eq!(hits[1].line, 3);
        assert_eq!(hits[1].tag, "FIXME");
        assert_eq!(hits[1].text, "broken */");
    }

    #[test]
    fn note_tag_is_supported() {
        let mut hits = Vec::new();
        collect_tags("src/sass/app.scss", "// NOTE colors come from the brand kit\n", &mut hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tag, "NOTE");
        assert_eq!(hits[0].text, "colors come from the brand kit");
    }

    #[test]
    fn tags_inside_words_do_not_match() {
        let mut hits = Vec::new();
        collect_tags("a.pug", "p KEYNOTES and TODOLIST are plain words\n", &mut hits);
        assert!(hits.is_empty(), "got: {hits:?}");
    }

    #[test]
    fn leftmost_tag_wins_on_a_line() {
        let mut hits = Vec::new();
        collect_tags("a.js", "// FIXME then TODO later\n", &mut hits);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].tag, "FIXME");
    }
}
