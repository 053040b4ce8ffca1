use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::scorer::Candidate;
use crate::settings::InsertPosition;

const BLOCK_START: &str = "<!-- kindred:similar-notes -->";
const BLOCK_END: &str = "<!-- /kindred:similar-notes -->";
const BLOCK_HEADING: &str = "## Similar notes";

/// A recognizer for one historical format of the link block.
#[derive(Debug)]
pub struct BlockFormat {
    pub version: u32,
    pub name: &'static str,
    pattern: Regex,
}

impl BlockFormat {
    fn new(version: u32, name: &'static str, pattern: &str) -> Self {
        Self {
            version,
            name,
            pattern: Regex::new(pattern).expect("static block pattern compiles"),
        }
    }
}

/// Known block formats, newest first. The first format that matches an
/// existing document wins.
pub static BLOCK_FORMATS: LazyLock<Vec<BlockFormat>> = LazyLock::new(|| {
    vec![
        BlockFormat::new(
            3,
            "marked",
            &format!(
                r"(?s){}.*?{}",
                regex::escape(BLOCK_START),
                regex::escape(BLOCK_END)
            ),
        ),
        BlockFormat::new(
            2,
            "heading-list",
            r"(?m)^## Similar notes\r?\n- \[\[[^\]\r\n]*\]\](?:\r?\n- \[\[[^\]\r\n]*\]\])*",
        ),
        BlockFormat::new(
            1,
            "bold-list",
            r"(?m)^\*\*Similar notes:\*\*\r?\n\* \[\[[^\]\r\n]*\]\](?:\r?\n\* \[\[[^\]\r\n]*\]\])*",
        ),
    ]
});

/// Render the current block format for `candidates`.
pub fn render_block(candidates: &[Candidate]) -> String {
    let mut block = format!("{BLOCK_START}\n{BLOCK_HEADING}\n");
    for candidate in candidates {
        block.push_str("- [[");
        block.push_str(candidate.note.link_target());
        block.push_str("]]\n");
    }
    block.push_str(BLOCK_END);
    block
}

/// Place `block` into `content`.
///
/// An existing block in any known format is replaced in place; otherwise
/// the block goes before or after the content. Merging the same block into
/// an already merged document reproduces it byte for byte.
pub fn merge(
    content: &str,
    block: &str,
    position: InsertPosition,
    formats: &[BlockFormat],
) -> String {
    for format in formats {
        if let Some(found) = format.pattern.find(content) {
            let mut merged = String::with_capacity(content.len() + block.len());
            merged.push_str(&content[..found.start()]);
            merged.push_str(block);
            merged.push_str(&content[found.end()..]);
            return merged;
        }
    }

    if content.trim().is_empty() {
        return format!("{block}\n");
    }
    match position {
        InsertPosition::Top => format!("{block}\n\n{content}"),
        InsertPosition::Bottom => format!("{}\n\n{block}\n", content.trim_end()),
    }
}

/// `content` with the first recognized link block removed, so a previously
/// inserted block never feeds term extraction.
pub fn strip_block<'a>(content: &'a str, formats: &[BlockFormat]) -> Cow<'a, str> {
    for format in formats {
        if let Some(found) = format.pattern.find(content) {
            let mut stripped = String::with_capacity(content.len());
            stripped.push_str(&content[..found.start()]);
            stripped.push_str(&content[found.end()..]);
            return Cow::Owned(stripped);
        }
    }
    Cow::Borrowed(content)
}

/// The format version of the first block found in `content`, if any.
pub fn detect_format(content: &str, formats: &[BlockFormat]) -> Option<u32> {
    formats
        .iter()
        .find(|f| f.pattern.is_match(content))
        .map(|f| f.version)
}
