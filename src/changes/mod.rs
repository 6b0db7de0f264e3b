//! Tree comparison: what changed between a base and a head checkout.

pub mod category;
pub mod compare;
pub mod render;
pub mod size;

pub use category::{Category, CategoryTables};
pub use compare::{compare, CompareError, Side};
pub use render::{render, DiffBlock, DiffContent};
pub use size::SizeEstimate;

/// A single file that differs between the two trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Root-relative path using `/` separators.
    pub relative_path: String,
    /// Semantic category derived from the path.
    pub category: Category,
    /// Size of the file content in bytes.
    pub size_bytes: u64,
    /// Approximate token count (`ceil(size_bytes / 4)`).
    pub token_estimate: u64,
    /// Set when the file could not be read during comparison.
    pub issue: Option<EntryIssue>,
}

impl FileEntry {
    /// Size in kilobytes, rounded to two decimal places.
    #[must_use]
    pub fn size_kb(&self) -> f64 {
        SizeEstimate::from_len(self.size_bytes).size_kb()
    }
}

/// A per-file problem recorded instead of aborting the comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryIssue {
    /// The file exists but its content could not be read.
    Unreadable(String),
}

/// The added / removed / modified triad produced by [`compare`].
///
/// The three sequences never share a path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Present only under the head root.
    pub added: Vec<FileEntry>,
    /// Present only under the base root.
    pub removed: Vec<FileEntry>,
    /// Present under both roots with different content.
    pub modified: Vec<FileEntry>,
}

impl ChangeSet {
    /// Returns `true` when the two trees had identical content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Iterates all entries in report order: added, removed, modified.
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.added.iter().chain(&self.removed).chain(&self.modified)
    }

    /// Sum of the token estimates of every entry.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.entries().map(|e| e.token_estimate).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, tokens: u64) -> FileEntry {
        FileEntry {
            relative_path: path.to_string(),
            category: Category::Code,
            size_bytes: tokens * 4,
            token_estimate: tokens,
            issue: None,
        }
    }

    #[test]
    fn empty_changeset_reports_empty() {
        assert!(ChangeSet::default().is_empty());
    }

    #[test]
    fn total_tokens_sums_all_sets() {
        let set = ChangeSet {
            added: vec![entry("a.rs", 3)],
            removed: vec![entry("b.rs", 5)],
            modified: vec![entry("c.rs", 7)],
        };
        assert!(!set.is_empty());
        assert_eq!(set.total_tokens(), 15);
        let paths: Vec<&str> = set.entries().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "b.rs", "c.rs"]);
    }
}
