//! Markdown serialization of a [`Report`].

use std::fmt::Write as _;

use crate::changes::render::DiffContent;
use crate::changes::{EntryIssue, FileEntry};
use crate::report::{NewContent, Report};

/// Top-level title line.
pub const TITLE: &str = "# Pull Request Review Context";
/// Summary heading.
pub const SUMMARY_HEADING: &str = "## Summary";
/// New-files heading.
pub const NEW_FILES_HEADING: &str = "## New Files:";
/// Deleted-files heading.
pub const DELETED_FILES_HEADING: &str = "## Deleted Files:";
/// Modified-files heading.
pub const MODIFIED_FILES_HEADING: &str = "## Modified Files:";
/// Diff section heading.
pub const DIFFS_HEADING: &str = "## Diffs:";
/// Commentary heading.
pub const COMMENTARY_HEADING: &str = "## Commentary:";

/// Opening tag prefix of an embedded new file.
pub const NEW_CONTENT_OPEN: &str = "<NEW_CONTENT";
/// Closing tag of an embedded new file.
pub const NEW_CONTENT_CLOSE: &str = "</NEW_CONTENT>";
/// Opening tag of the pull request description.
pub const DESCRIPTION_OPEN: &str = "<DESCRIPTION>";
/// Closing tag of the pull request description.
pub const DESCRIPTION_CLOSE: &str = "</DESCRIPTION>";
/// Opening tag prefix of a diff block.
pub const DIFF_OPEN: &str = "<DIFF";
/// Closing tag of a diff block.
pub const DIFF_CLOSE: &str = "</DIFF>";

/// Placeholder for an empty file list.
pub const NONE_FOUND: &str = "_None found._";
/// Placeholder for an empty diff section.
pub const NO_CHANGES: &str = "_No changes._";
/// Placeholder for an empty comment list.
pub const NO_COMMENTS: &str = "_No comments found._";

/// Renders the report as Markdown. Pure and deterministic.
///
/// Every multi-line body (description, new file content, diff) is wrapped in a
/// backtick fence longer than any backtick run inside it, and list paths sit in
/// code spans sized the same way, so [`parse`](crate::report::parse::parse) can
/// tell report structure from embedded text.
#[must_use]
pub fn serialize(report: &Report) -> String {
    let mut out = String::new();
    write_header(&mut out, report);
    write_summary(&mut out, report);

    let _ = writeln!(out, "{NEW_FILES_HEADING}\n");
    let added: Vec<&FileEntry> = report.new_files.iter().map(|f| &f.entry).collect();
    write_list(&mut out, &added, |_| String::new());
    for file in &report.new_files {
        if let Some(content) = &file.content {
            write_new_content(&mut out, &file.entry.relative_path, content);
        }
    }

    let _ = writeln!(out, "{DELETED_FILES_HEADING}\n");
    write_list(&mut out, &report.deleted_files.iter().collect::<Vec<_>>(), |_| String::new());

    let _ = writeln!(out, "{MODIFIED_FILES_HEADING}\n");
    write_list(&mut out, &report.modified_files.iter().collect::<Vec<_>>(), |entry| {
        report
            .diffs
            .iter()
            .find(|d| d.path == entry.relative_path)
            .map(|d| format!(", +{} -{}", d.added_lines, d.removed_lines))
            .unwrap_or_default()
    });

    let _ = writeln!(out, "{DIFFS_HEADING}\n");
    if report.diffs.is_empty() {
        let _ = writeln!(out, "{NO_CHANGES}\n");
    }
    for diff in &report.diffs {
        let _ = writeln!(
            out,
            "{DIFF_OPEN} path=\"{}\" added=\"{}\" removed=\"{}\">",
            escape_attr(&diff.path),
            diff.added_lines,
            diff.removed_lines
        );
        match &diff.content {
            DiffContent::Hunks(lines) => {
                let body = lines.join("\n");
                let fence = fence_for(&body);
                let _ = writeln!(out, "{fence}diff\n{body}\n{fence}");
            }
            DiffContent::Binary | DiffContent::Unreadable(_) => {
                let _ = writeln!(out, "_{}_", diff.placeholder().unwrap_or_default());
            }
        }
        let _ = writeln!(out, "{DIFF_CLOSE}\n");
    }

    write_commentary(&mut out, report);
    out
}

fn write_header(out: &mut String, report: &Report) {
    let h = &report.header;
    let _ = writeln!(out, "{TITLE}\n");
    let _ = writeln!(out, "- **Pull Request:** {}", one_line(&h.pr_id));
    let _ = writeln!(out, "- **Repository:** {}", one_line(&h.repository));
    if let Some(title) = &h.title {
        let _ = writeln!(out, "- **Title:** {}", one_line(title));
    }
    if let Some(author) = &h.author {
        let _ = writeln!(out, "- **Author:** {}", one_line(author));
    }
    let _ = writeln!(out, "- **Base Ref:** {}", one_line(&h.base_ref));
    let _ = writeln!(out, "- **Head Ref:** {}", one_line(&h.head_ref));
    let _ = writeln!(out, "- **Source:** {}", one_line(&h.source_url));
    let _ = writeln!(out, "- **Generated:** {}\n", one_line(&h.generated_at));
    if let Some(description) = &h.description {
        let body = description.trim_end();
        let fence = fence_for(body);
        let _ = writeln!(
            out,
            "{DESCRIPTION_OPEN}\n{fence}\n{body}\n{fence}\n{DESCRIPTION_CLOSE}\n"
        );
    }
}

fn write_summary(out: &mut String, report: &Report) {
    let s = &report.summary;
    let _ = writeln!(out, "{SUMMARY_HEADING}\n");
    let _ = writeln!(out, "New: {} | Modified: {} | Deleted: {}", s.new, s.modified, s.deleted);
    let _ = writeln!(out, "Lines changed: +{} -{}", s.lines_added, s.lines_removed);
    let _ = writeln!(out, "Estimated tokens: {}\n", s.total_tokens);
    if s.categories.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    let _ = writeln!(out, "| Category | New | Modified | Deleted | Tokens |");
    let _ = writeln!(out, "| --- | ---: | ---: | ---: | ---: |");
    for (category, count) in &s.categories {
        let _ = writeln!(
            out,
            "| {category} | {} | {} | {} | {} |",
            count.new, count.modified, count.deleted, count.tokens
        );
    }
    out.push('\n');
}

/// Writes one `- \`path\` (...)` line per entry, or the none-found placeholder.
fn write_list(out: &mut String, entries: &[&FileEntry], extra: impl Fn(&FileEntry) -> String) {
    if entries.is_empty() {
        let _ = writeln!(out, "{NONE_FOUND}\n");
        return;
    }
    for entry in entries {
        let issue = match &entry.issue {
            Some(EntryIssue::Unreadable(reason)) => format!(", unreadable: {}", one_line(reason)),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "- {} ({}, {:.2} KB, ~{} tokens{}{issue})",
            code_span(&entry.relative_path),
            entry.category,
            entry.size_kb(),
            entry.token_estimate,
            extra(entry)
        );
    }
    out.push('\n');
}

fn write_new_content(out: &mut String, path: &str, content: &NewContent) {
    let _ = writeln!(out, "{NEW_CONTENT_OPEN} path=\"{}\">", escape_attr(path));
    match content {
        NewContent::Text(text) => {
            let fence = fence_for(text);
            let body = text.strip_suffix('\n').unwrap_or(text);
            let _ = writeln!(out, "{fence}\n{body}\n{fence}");
        }
        NewContent::Binary => {
            let _ = writeln!(out, "_Binary file; content not shown._");
        }
        NewContent::TooLarge { size_bytes, limit } => {
            let _ = writeln!(
                out,
                "_File is {size_bytes} bytes, above the {limit} byte limit; content not shown._"
            );
        }
        NewContent::Unreadable(reason) => {
            let _ = writeln!(out, "_File could not be read: {}_", one_line(reason));
        }
    }
    let _ = writeln!(out, "{NEW_CONTENT_CLOSE}\n");
}

/// Omitted entirely when comments were never requested.
fn write_commentary(out: &mut String, report: &Report) {
    let Some(commentary) = &report.commentary else {
        return;
    };
    let _ = writeln!(out, "{COMMENTARY_HEADING}\n");
    match commentary {
        Err(reason) => {
            let _ = writeln!(out, "_Comments unavailable: {}_", one_line(reason));
        }
        Ok(comments) if comments.is_empty() => {
            let _ = writeln!(out, "{NO_COMMENTS}");
        }
        Ok(comments) => {
            for (i, comment) in comments.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "### Comment {} by {} at {}\n",
                    i + 1,
                    one_line(&comment.author),
                    one_line(&comment.timestamp)
                );
                if let Some(path) = &comment.path {
                    let span = code_span(path);
                    match comment.line {
                        Some(line) => {
                            let _ = writeln!(out, "File: {span} line {line}\n");
                        }
                        None => {
                            let _ = writeln!(out, "File: {span}\n");
                        }
                    }
                }
                let _ = writeln!(out, "{}\n", comment.body.trim_end());
            }
        }
    }
}

/// A backtick fence longer than any backtick run inside `text`.
fn fence_for(text: &str) -> String {
    "`".repeat(longest_backtick_run(text).max(2) + 1)
}

/// Inline code span that survives backticks in `text`.
///
/// The delimiter is one backtick longer than the longest run inside `text`.
/// Text that starts or ends with a backtick or a space is padded with one
/// space on each side, which readers strip again.
pub(crate) fn code_span(text: &str) -> String {
    let ticks = "`".repeat(longest_backtick_run(text) + 1);
    let needs_padding = |c: char| c == '`' || c == ' ';
    if text.starts_with(needs_padding) || text.ends_with(needs_padding) {
        format!("{ticks} {text} {ticks}")
    } else {
        format!("{ticks}{text}{ticks}")
    }
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    for c in text.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    longest
}

/// Collapses line breaks so a value cannot start a new Markdown line.
fn one_line(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Escapes a value for use inside a double-quoted tag attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::render::render_text;
    use crate::changes::{Category, ChangeSet};
    use crate::pr::ReviewComment;
    use crate::report::ReportHeader;

    fn header() -> ReportHeader {
        ReportHeader {
            pr_id: "42".to_string(),
            repository: "acme/widgets".to_string(),
            base_ref: "main".to_string(),
            head_ref: "feature".to_string(),
            source_url: "https://github.com/acme/widgets/pull/42".to_string(),
            title: Some("Add parser".to_string()),
            author: None,
            description: None,
            generated_at: "2024-06-15T10:30:00Z".to_string(),
        }
    }

    fn entry(path: &str, category: Category, size: u64) -> FileEntry {
        FileEntry {
            relative_path: path.to_string(),
            category,
            size_bytes: size,
            token_estimate: size.div_ceil(4),
            issue: None,
        }
    }

    fn sample() -> Report {
        let changes = ChangeSet {
            added: vec![entry("c.js", Category::Code, 3)],
            removed: vec![],
            modified: vec![entry("b.js", Category::Code, 1)],
        };
        let diffs = vec![render_text("b.js", "y\n", "z\n", 3)];
        let mut report = Report::build(header(), changes, diffs, Some(Ok(vec![])));
        report.attach_new_content("c.js", NewContent::Text("new\n".to_string()));
        report
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let text = serialize(&sample());
        let positions: Vec<usize> = [
            TITLE,
            SUMMARY_HEADING,
            NEW_FILES_HEADING,
            DELETED_FILES_HEADING,
            MODIFIED_FILES_HEADING,
            DIFFS_HEADING,
            COMMENTARY_HEADING,
        ]
        .iter()
        .map(|h| text.find(h).unwrap_or_else(|| panic!("missing {h}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn header_and_summary_fields() {
        let text = serialize(&sample());
        assert!(text.contains("- **Pull Request:** 42"));
        assert!(text.contains("- **Title:** Add parser"));
        assert!(!text.contains("**Author:**"));
        assert!(text.contains("- **Generated:** 2024-06-15T10:30:00Z"));
        assert!(text.contains("New: 1 | Modified: 1 | Deleted: 0"));
        assert!(text.contains("Lines changed: +1 -1"));
        assert!(text.contains("| Code | 1 | 1 | 0 | 2 |"));
    }

    #[test]
    fn file_lists_and_blocks() {
        let text = serialize(&sample());
        assert!(text.contains("- `c.js` (Code, 0.00 KB, ~1 tokens)"));
        assert!(text.contains("- `b.js` (Code, 0.00 KB, ~1 tokens, +1 -1)"));
        assert!(text.contains("<NEW_CONTENT path=\"c.js\">\n```\nnew\n```\n</NEW_CONTENT>"));
        assert!(text.contains(concat!(
            "<DIFF path=\"b.js\" added=\"1\" removed=\"1\">\n",
            "```diff\n@@ -1 +1 @@\n-y\n+z\n```\n</DIFF>"
        )));
        assert!(text.contains(&format!("{DELETED_FILES_HEADING}\n\n{NONE_FOUND}")));
        assert!(text.contains(NO_COMMENTS));
    }

    #[test]
    fn empty_report_uses_placeholders() {
        let report = Report::build(header(), ChangeSet::default(), vec![], Some(Ok(vec![])));
        let text = serialize(&report);
        assert!(text.contains("New: 0 | Modified: 0 | Deleted: 0"));
        assert!(text.contains(&format!("{DIFFS_HEADING}\n\n{NO_CHANGES}")));
        assert_eq!(text.matches(NONE_FOUND).count(), 4);
    }

    #[test]
    fn commentary_renders_comments_and_failures() {
        let comments = vec![ReviewComment {
            author: "bob".to_string(),
            timestamp: "2024-05-02T10:00:00Z".to_string(),
            body: "nit: rename".to_string(),
            path: Some("src/a.rs".to_string()),
            line: Some(12),
        }];
        let report = Report::build(header(), ChangeSet::default(), vec![], Some(Ok(comments)));
        let text = serialize(&report);
        assert!(text.contains("### Comment 1 by bob at 2024-05-02T10:00:00Z"));
        assert!(text.contains("File: `src/a.rs` line 12"));
        assert!(text.contains("nit: rename"));

        let failed =
            Report::build(header(), ChangeSet::default(), vec![], Some(Err("HTTP 403".into())));
        assert!(serialize(&failed).contains("_Comments unavailable: HTTP 403_"));
    }

    #[test]
    fn commentary_is_omitted_when_not_requested() {
        let report = Report::build(header(), ChangeSet::default(), vec![], None);
        let text = serialize(&report);
        assert!(!text.contains(COMMENTARY_HEADING));
        assert!(!text.contains(NO_COMMENTS));
        assert!(text.ends_with(&format!("{NO_CHANGES}\n\n")));
    }

    #[test]
    fn placeholders_for_binary_and_oversized_content() {
        let changes = ChangeSet {
            added: vec![
                entry("logo.png", Category::Images, 10),
                entry("big.txt", Category::Docs, 10),
            ],
            ..ChangeSet::default()
        };
        let mut report = Report::build(header(), changes, vec![], Some(Ok(vec![])));
        report.attach_new_content("logo.png", NewContent::Binary);
        report.attach_new_content("big.txt", NewContent::TooLarge { size_bytes: 10, limit: 5 });
        let text = serialize(&report);
        assert!(text.contains("_Binary file; content not shown._"));
        assert!(text.contains("_File is 10 bytes, above the 5 byte limit; content not shown._"));
    }

    #[test]
    fn fence_outgrows_backticks_in_content() {
        assert_eq!(fence_for("plain"), "```");
        assert_eq!(fence_for("has ``` inside"), "````");
    }

    #[test]
    fn code_span_outgrows_backticks_in_path() {
        assert_eq!(code_span("src/a.rs"), "`src/a.rs`");
        assert_eq!(code_span("odd` (name.rs"), "``odd` (name.rs``");
        assert_eq!(code_span("`tick"), "`` `tick ``");
        assert_eq!(code_span(" padded"), "`  padded `");
    }

    #[test]
    fn description_is_fenced() {
        let mut h = header();
        h.description = Some("Ends with\n</DESCRIPTION>\n".to_string());
        let report = Report::build(h, ChangeSet::default(), vec![], None);
        let text = serialize(&report);
        let expected = "<DESCRIPTION>\n```\nEnds with\n</DESCRIPTION>\n```\n</DESCRIPTION>\n";
        assert!(text.contains(expected), "{text}");
    }

    #[test]
    fn header_values_stay_on_one_line() {
        let mut h = header();
        h.title = Some("Fix\n## Deleted Files:".to_string());
        let report = Report::build(h, ChangeSet::default(), vec![], None);
        assert!(serialize(&report).contains("- **Title:** Fix ## Deleted Files:\n"));
    }

    #[test]
    fn attributes_are_escaped() {
        assert_eq!(escape_attr("a\"b<c>&d"), "a&quot;b&lt;c&gt;&amp;d");
        assert_eq!(escape_attr("two\nlines"), "two&#10;lines");
    }

    #[test]
    fn serialization_is_deterministic() {
        assert_eq!(serialize(&sample()), serialize(&sample()));
    }
}
