//! Review-context report: assembly, Markdown serialization and parsing.
//!
//! A [`Report`] is built once per run from a [`ChangeSet`] and the rendered
//! diffs, then serialized by [`markdown::serialize`]. Section order and the
//! delimiter scheme are fixed so downstream prompts can rely on them:
//!
//! ```text
//! # Pull Request Review Context     header fields
//! ## Summary                        counts, lines, tokens, category table
//! ## New Files:                     list, then <NEW_CONTENT path="..."> blocks
//! ## Deleted Files:
//! ## Modified Files:
//! ## Diffs:                         <DIFF path="..."> blocks, Modified order
//! ## Commentary:                    only when comments were requested
//! ```

pub mod markdown;
pub mod parse;

use std::collections::{BTreeMap, HashMap};

use crate::changes::render::{DiffBlock, DiffContent};
use crate::changes::{Category, ChangeSet, FileEntry};
use crate::pr::ReviewComment;

pub use markdown::serialize;
pub use parse::{parse, ParsedSections};

/// Comments fetched from the host, or the reason they are unavailable.
pub type Commentary = Result<Vec<ReviewComment>, String>;

/// Metadata printed at the top of the report. Values are passed through verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportHeader {
    /// Pull request number or ID.
    pub pr_id: String,
    /// Repository identifier.
    pub repository: String,
    /// Target branch.
    pub base_ref: String,
    /// Source branch.
    pub head_ref: String,
    /// Web URL of the pull request.
    pub source_url: String,
    /// Pull request title.
    pub title: Option<String>,
    /// Pull request author.
    pub author: Option<String>,
    /// Description body.
    pub description: Option<String>,
    /// Generation timestamp (RFC 3339).
    pub generated_at: String,
}

/// Per-category tallies for the summary table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCount {
    /// Added files in this category.
    pub new: usize,
    /// Modified files in this category.
    pub modified: usize,
    /// Deleted files in this category.
    pub deleted: usize,
    /// Token estimate over all files in this category.
    pub tokens: u64,
}

/// Aggregate numbers shown in the Summary section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Number of added files.
    pub new: usize,
    /// Number of modified files.
    pub modified: usize,
    /// Number of deleted files.
    pub deleted: usize,
    /// `+` lines across all diffs.
    pub lines_added: usize,
    /// `-` lines across all diffs.
    pub lines_removed: usize,
    /// Token estimate over every listed file.
    pub total_tokens: u64,
    /// Non-empty categories in [`Category::ALL`] order.
    pub categories: BTreeMap<Category, CategoryCount>,
}

/// Full content of an added file, or why it is not shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewContent {
    /// UTF-8 text of the file.
    Text(String),
    /// Binary or not valid UTF-8.
    Binary,
    /// Larger than the configured limit.
    TooLarge {
        /// Actual size.
        size_bytes: u64,
        /// Configured limit.
        limit: u64,
    },
    /// Could not be read.
    Unreadable(String),
}

/// An added file with its optional embedded content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    /// The changeset entry.
    pub entry: FileEntry,
    /// Content to embed; `None` when content embedding is off.
    pub content: Option<NewContent>,
}

/// The assembled report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Header metadata.
    pub header: ReportHeader,
    /// Counts and category breakdown.
    pub summary: Summary,
    /// Added files, in changeset order.
    pub new_files: Vec<NewFile>,
    /// Removed files, in changeset order.
    pub deleted_files: Vec<FileEntry>,
    /// Modified files, in changeset order.
    pub modified_files: Vec<FileEntry>,
    /// One diff per modified file, in the same order.
    pub diffs: Vec<DiffBlock>,
    /// Review comments section; `None` when comments were never requested.
    pub commentary: Option<Commentary>,
}

impl Report {
    /// Assembles a report.
    ///
    /// `diffs` are matched to modified files by path and emitted in the
    /// modified order. A modified file without a diff gets a placeholder
    /// block; diffs for paths outside the modified set are dropped.
    #[must_use]
    pub fn build(
        header: ReportHeader,
        changes: ChangeSet,
        diffs: Vec<DiffBlock>,
        commentary: Option<Commentary>,
    ) -> Self {
        let mut by_path: HashMap<String, DiffBlock> =
            diffs.into_iter().map(|d| (d.path.clone(), d)).collect();
        let diffs: Vec<DiffBlock> = changes
            .modified
            .iter()
            .map(|entry| {
                by_path.remove(&entry.relative_path).unwrap_or_else(|| DiffBlock {
                    path: entry.relative_path.clone(),
                    added_lines: 0,
                    removed_lines: 0,
                    content: DiffContent::Unreadable("diff was not rendered".to_string()),
                })
            })
            .collect();
        for stray in by_path.keys() {
            log::warn!("dropping diff for {stray}: not in the modified set");
        }

        let summary = summarize(&changes, &diffs);
        Self {
            header,
            summary,
            new_files: changes
                .added
                .into_iter()
                .map(|entry| NewFile { entry, content: None })
                .collect(),
            deleted_files: changes.removed,
            modified_files: changes.modified,
            diffs,
            commentary,
        }
    }

    /// Sets the embedded content of the added file at `path`.
    ///
    /// Returns `false` if no added file has that path.
    pub fn attach_new_content(&mut self, path: &str, content: NewContent) -> bool {
        match self.new_files.iter_mut().find(|f| f.entry.relative_path == path) {
            Some(file) => {
                file.content = Some(content);
                true
            }
            None => false,
        }
    }
}

fn summarize(changes: &ChangeSet, diffs: &[DiffBlock]) -> Summary {
    let mut categories: BTreeMap<Category, CategoryCount> = BTreeMap::new();
    for entry in &changes.added {
        let count = categories.entry(entry.category).or_default();
        count.new += 1;
        count.tokens += entry.token_estimate;
    }
    for entry in &changes.modified {
        let count = categories.entry(entry.category).or_default();
        count.modified += 1;
        count.tokens += entry.token_estimate;
    }
    for entry in &changes.removed {
        let count = categories.entry(entry.category).or_default();
        count.deleted += 1;
        count.tokens += entry.token_estimate;
    }
    Summary {
        new: changes.added.len(),
        modified: changes.modified.len(),
        deleted: changes.removed.len(),
        lines_added: diffs.iter().map(|d| d.added_lines).sum(),
        lines_removed: diffs.iter().map(|d| d.removed_lines).sum(),
        total_tokens: changes.total_tokens(),
        categories,
    }
}
