//! Unified-diff rendering for modified files.

use std::path::Path;

use similar::{ChangeTag, TextDiff};

use crate::ports::filesystem::FileSystem;

/// Default number of context lines around each hunk.
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// How many leading bytes are inspected for a NUL when sniffing binaries.
const BINARY_SNIFF_LEN: usize = 8000;

/// Shown in place of a trailing carriage return when the two sides use
/// different line endings.
pub const CR_MARKER: char = '\u{240D}';

/// Rendered diff body of one modified file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBlock {
    /// Root-relative path of the file.
    pub path: String,
    /// Total `+` lines across all hunks.
    pub added_lines: usize,
    /// Total `-` lines across all hunks.
    pub removed_lines: usize,
    /// Hunk lines or a placeholder.
    pub content: DiffContent,
}

/// What a [`DiffBlock`] carries in place of its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffContent {
    /// Hunk headers followed by ` `, `+` or `-` prefixed lines.
    Hunks(Vec<String>),
    /// One side is binary or not valid UTF-8.
    Binary,
    /// One side could not be read.
    Unreadable(String),
}

impl DiffBlock {
    /// One-line placeholder text, or `None` when the block has hunks.
    #[must_use]
    pub fn placeholder(&self) -> Option<String> {
        match &self.content {
            DiffContent::Hunks(_) => None,
            DiffContent::Binary => Some("Binary file differs; content not shown.".to_string()),
            DiffContent::Unreadable(reason) => Some(format!("File could not be read: {reason}")),
        }
    }
}

/// Renders the diff between `base_file` and `head_file`, labelled `path`.
///
/// Never fails: unreadable and binary content turn into placeholders.
#[must_use]
pub fn render(
    fs: &dyn FileSystem,
    path: &str,
    base_file: &Path,
    head_file: &Path,
    context_lines: usize,
) -> DiffBlock {
    let read = |file: &Path| {
        fs.read(file).map_err(|e| {
            log::debug!("diff of {path}: cannot read {}: {e}", file.display());
            e.to_string()
        })
    };
    let (old, new) = match (read(base_file), read(head_file)) {
        (Ok(old), Ok(new)) => (old, new),
        (Err(reason), _) | (_, Err(reason)) => {
            return placeholder_block(path, DiffContent::Unreadable(reason));
        }
    };
    match (decode_text(&old), decode_text(&new)) {
        (Some(old), Some(new)) => render_text(path, old, new, context_lines),
        _ => placeholder_block(path, DiffContent::Binary),
    }
}

/// Renders a unified diff of two in-memory texts.
///
/// Line terminators are dropped from the rendered lines. When the sides
/// disagree on line endings, a trailing `\r` is rendered as [`CR_MARKER`] so
/// an LF to CRLF conversion does not look like identical `-`/`+` pairs.
#[must_use]
pub fn render_text(path: &str, old: &str, new: &str, context_lines: usize) -> DiffBlock {
    let show_cr = line_endings(old) != line_endings(new);
    let diff = TextDiff::from_lines(old, new);
    let mut unified = diff.unified_diff();
    unified.context_radius(context_lines);

    let mut lines = Vec::new();
    let mut added_lines = 0;
    let mut removed_lines = 0;

    for hunk in unified.iter_hunks() {
        lines.push(hunk.header().to_string());
        for change in hunk.iter_changes() {
            let marker = match change.tag() {
                ChangeTag::Equal => ' ',
                ChangeTag::Insert => {
                    added_lines += 1;
                    '+'
                }
                ChangeTag::Delete => {
                    removed_lines += 1;
                    '-'
                }
            };
            let text = change.value();
            let text = text.strip_suffix('\n').unwrap_or(text);
            let text = match text.strip_suffix('\r') {
                Some(stripped) if show_cr => format!("{stripped}{CR_MARKER}"),
                Some(stripped) => stripped.to_string(),
                None => text.to_string(),
            };
            lines.push(format!("{marker}{text}"));
            if change.missing_newline() {
                lines.push("\\ No newline at end of file".to_string());
            }
        }
    }

    DiffBlock {
        path: path.to_string(),
        added_lines,
        removed_lines,
        content: DiffContent::Hunks(lines),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineEndings {
    Lf,
    Crlf,
    Mixed,
}

fn line_endings(text: &str) -> LineEndings {
    let crlf = text.matches("\r\n").count();
    if crlf == 0 {
        LineEndings::Lf
    } else if crlf == text.matches('\n').count() {
        LineEndings::Crlf
    } else {
        LineEndings::Mixed
    }
}

/// Returns the content as text, or `None` if it looks binary.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> Option<&str> {
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return None;
    }
    std::str::from_utf8(bytes).ok()
}

fn placeholder_block(path: &str, content: DiffContent) -> DiffBlock {
    DiffBlock { path: path.to_string(), added_lines: 0, removed_lines: 0, content }
}
