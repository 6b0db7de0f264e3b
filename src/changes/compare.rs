//! Computes the added / removed / modified sets between two trees.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::changes::category::CategoryTables;
use crate::changes::size::SizeEstimate;
use crate::changes::{ChangeSet, EntryIssue, FileEntry};
use crate::ports::filesystem::FileSystem;

/// Which of the two trees a root belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The pre-change tree.
    Base,
    /// The post-change tree.
    Head,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Base => f.write_str("base"),
            Side::Head => f.write_str("head"),
        }
    }
}

/// Conditions that make a comparison impossible.
#[derive(Debug, Error)]
pub enum CompareError {
    /// The root does not exist or is not a directory.
    #[error("{side} root {} does not exist or is not a directory", path.display())]
    MissingRoot {
        /// Which tree failed.
        side: Side,
        /// The offending root.
        path: PathBuf,
    },
    /// The root exists but could not be enumerated.
    #[error("failed to enumerate {side} root {}: {reason}", path.display())]
    Unlistable {
        /// Which tree failed.
        side: Side,
        /// The offending root.
        path: PathBuf,
        /// Underlying I/O error.
        reason: String,
    },
}

/// Knobs for [`compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// Tables used to categorize every entry.
    pub tables: CategoryTables,
    /// Directory names skipped during traversal.
    pub exclude_dirs: Vec<String>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self { tables: CategoryTables::default(), exclude_dirs: vec![".git".to_string()] }
    }
}

/// Compares the trees under `base_root` and `head_root`.
///
/// Every list in the result is ordered byte-wise by relative path. Content
/// equality is decided by SHA-256 digest; size and mtime are never consulted.
/// Files that cannot be read are annotated with [`EntryIssue::Unreadable`]
/// rather than failing the run; a file unreadable on either side of a shared
/// path is reported as modified.
///
/// # Errors
///
/// Returns [`CompareError`] when either root is missing or cannot be listed.
pub fn compare(
    fs: &dyn FileSystem,
    base_root: &Path,
    head_root: &Path,
    options: &CompareOptions,
) -> Result<ChangeSet, CompareError> {
    let base_files = list_root(fs, Side::Base, base_root, &options.exclude_dirs)?;
    let head_files = list_root(fs, Side::Head, head_root, &options.exclude_dirs)?;
    log::info!(
        "comparing {} base files against {} head files",
        base_files.len(),
        head_files.len()
    );

    let mut changes = ChangeSet::default();

    for path in &head_files {
        if !base_files.contains(path) {
            let read = read_file(fs, head_root, path);
            changes.added.push(make_entry(options, path, &read));
        }
    }

    for path in &base_files {
        if !head_files.contains(path) {
            let read = read_file(fs, base_root, path);
            changes.removed.push(make_entry(options, path, &read));
        }
    }

    for path in base_files.intersection(&head_files) {
        let base = read_file(fs, base_root, path);
        let head = read_file(fs, head_root, path);
        if let (Ok(old), Ok(new)) = (&base, &head) {
            if digest(old) == digest(new) {
                continue;
            }
        }
        // Size comes from the head side when it is readable, the base side otherwise.
        let sized = if head.is_ok() { &head } else { &base };
        let mut entry = make_entry(options, path, sized);
        entry.issue = head
            .as_ref()
            .err()
            .or(base.as_ref().err())
            .map(|reason| EntryIssue::Unreadable(reason.clone()));
        changes.modified.push(entry);
    }

    log::info!(
        "changeset: {} added, {} removed, {} modified",
        changes.added.len(),
        changes.removed.len(),
        changes.modified.len()
    );
    Ok(changes)
}

fn list_root(
    fs: &dyn FileSystem,
    side: Side,
    root: &Path,
    exclude_dirs: &[String],
) -> Result<BTreeSet<String>, CompareError> {
    if !fs.is_dir(root) {
        return Err(CompareError::MissingRoot { side, path: root.to_path_buf() });
    }
    let files = fs.list_files(root, exclude_dirs).map_err(|e| CompareError::Unlistable {
        side,
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(files.into_iter().collect())
}

fn read_file(fs: &dyn FileSystem, root: &Path, relative: &str) -> Result<Vec<u8>, String> {
    fs.read(&root.join(relative)).map_err(|e| {
        log::warn!("could not read {relative} under {}: {e}", root.display());
        e.to_string()
    })
}

fn digest(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// Builds an entry; a failed read keeps the entry with zero size.
fn make_entry(options: &CompareOptions, path: &str, read: &Result<Vec<u8>, String>) -> FileEntry {
    let (estimate, issue) = match read {
        Ok(bytes) => (SizeEstimate::from_len(bytes.len() as u64), None),
        Err(reason) => (SizeEstimate::default(), Some(EntryIssue::Unreadable(reason.clone()))),
    };
    FileEntry {
        relative_path: path.to_string(),
        category: options.tables.categorize(path),
        size_bytes: estimate.size_bytes,
        token_estimate: estimate.token_estimate,
        issue,
    }
}
