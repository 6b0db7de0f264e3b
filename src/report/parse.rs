//! Recovers the file lists from a serialized report.

use crate::report::markdown::{
    COMMENTARY_HEADING, DELETED_FILES_HEADING, DESCRIPTION_CLOSE, DESCRIPTION_OPEN, DIFF_CLOSE,
    DIFF_OPEN, MODIFIED_FILES_HEADING, NEW_CONTENT_CLOSE, NEW_CONTENT_OPEN, NEW_FILES_HEADING,
};

/// Paths found in each section of a serialized report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSections {
    /// Entries under "New Files:".
    pub added: Vec<String>,
    /// Entries under "Deleted Files:".
    pub removed: Vec<String>,
    /// Entries under "Modified Files:".
    pub modified: Vec<String>,
    /// `path` attributes of `<DIFF>` blocks, in order.
    pub diffs: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Added,
    Removed,
    Modified,
}

/// Position inside a `<DESCRIPTION>`, `<NEW_CONTENT>` or `<DIFF>` block.
enum Block {
    /// Just past the opening tag; the next line is a fence or a placeholder.
    Opened(&'static str),
    /// Inside the fenced body; only the same fence ends it.
    Fenced { fence: String, close: &'static str },
    /// Body done; waiting for the closing tag.
    Closing(&'static str),
}

/// Parses section markers out of a report produced by
/// [`serialize`](crate::report::markdown::serialize).
///
/// Block bodies are skipped by their fence, so embedded text that repeats a
/// closing tag or a heading never leaks into the lists. Parsing stops at the
/// Commentary heading.
#[must_use]
pub fn parse(text: &str) -> ParsedSections {
    let mut parsed = ParsedSections::default();
    let mut section = None;
    let mut block: Option<Block> = None;

    for line in text.lines() {
        if let Some(current) = block.take() {
            block = advance(current, line);
            continue;
        }
        if line == DESCRIPTION_OPEN {
            block = Some(Block::Opened(DESCRIPTION_CLOSE));
            continue;
        }
        if line.starts_with(NEW_CONTENT_OPEN) {
            block = Some(Block::Opened(NEW_CONTENT_CLOSE));
            continue;
        }
        if line.starts_with(DIFF_OPEN) {
            if let Some(path) = attribute(line, "path") {
                parsed.diffs.push(path);
            }
            block = Some(Block::Opened(DIFF_CLOSE));
            continue;
        }
        if line.starts_with("## ") {
            if line == COMMENTARY_HEADING {
                break;
            }
            section = match line {
                NEW_FILES_HEADING => Some(Section::Added),
                DELETED_FILES_HEADING => Some(Section::Removed),
                MODIFIED_FILES_HEADING => Some(Section::Modified),
                _ => None,
            };
            continue;
        }
        let (Some(section), Some(path)) = (section, list_item_path(line)) else {
            continue;
        };
        match section {
            Section::Added => parsed.added.push(path),
            Section::Removed => parsed.removed.push(path),
            Section::Modified => parsed.modified.push(path),
        }
    }

    parsed
}

/// Consumes one line inside a block; `None` once the closing tag is seen.
fn advance(block: Block, line: &str) -> Option<Block> {
    match block {
        Block::Opened(close) if line == close => None,
        Block::Opened(close) => match leading_backticks(line) {
            0 => Some(Block::Closing(close)),
            n => Some(Block::Fenced { fence: line[..n].to_string(), close }),
        },
        Block::Fenced { fence, close } if line == fence => Some(Block::Closing(close)),
        fenced @ Block::Fenced { .. } => Some(fenced),
        Block::Closing(close) if line == close => None,
        closing @ Block::Closing(_) => Some(closing),
    }
}

fn leading_backticks(line: &str) -> usize {
    line.len() - line.trim_start_matches('`').len()
}

/// Extracts the path from a ``- `path` (...)`` list line.
///
/// The code span delimiter may be longer than one backtick, and one space of
/// padding on each side is removed.
fn list_item_path(line: &str) -> Option<String> {
    let rest = line.strip_prefix("- ")?;
    let ticks = leading_backticks(rest);
    if ticks == 0 {
        return None;
    }
    let (delimiter, body) = rest.split_at(ticks);
    let end = body.find(delimiter)?;
    if !body[end + ticks..].starts_with(" (") {
        return None;
    }
    let path = &body[..end];
    let path = path.strip_prefix(' ').and_then(|p| p.strip_suffix(' ')).unwrap_or(path);
    Some(path.to_string())
}

/// Reads a double-quoted attribute value from a tag line.
fn attribute(line: &str, name: &str) -> Option<String> {
    let marker = format!(" {name}=\"");
    let start = line.find(&marker)? + marker.len();
    let len = line[start..].find('"')?;
    Some(unescape_attr(&line[start..start + len]))
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&#10;", "\n")
        .replace("&#13;", "\r")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
