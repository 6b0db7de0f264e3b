//! Fixed adapter for the `GitRepo` port that copies staged directories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::ports::git::{GitRepo, HttpCredentials};

/// One recorded call to [`StagedGitRepo::shallow_clone`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedClone {
    /// URL exactly as passed in.
    pub url: String,
    /// Branch that was requested.
    pub reference: String,
    /// Credentials handed over alongside the URL.
    pub credentials: Option<HttpCredentials>,
}

/// Serves "clones" by copying a prepared directory for each ref.
pub struct StagedGitRepo {
    trees: HashMap<String, PathBuf>,
    clones: Mutex<Vec<StagedClone>>,
}

impl StagedGitRepo {
    /// Creates a repo with no staged refs.
    #[must_use]
    pub fn new() -> Self {
        Self { trees: HashMap::new(), clones: Mutex::new(Vec::new()) }
    }

    /// Stages `tree` as the content of `reference`.
    #[must_use]
    pub fn with_ref(mut self, reference: &str, tree: &Path) -> Self {
        self.trees.insert(reference.to_string(), tree.to_path_buf());
        self
    }

    /// Clones requested so far, in call order.
    #[must_use]
    pub fn clones(&self) -> Vec<StagedClone> {
        self.clones.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for StagedGitRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRepo for StagedGitRepo {
    fn available(&self) -> bool {
        true
    }

    fn shallow_clone(
        &self,
        url: &str,
        reference: &str,
        dest: &Path,
        credentials: Option<&HttpCredentials>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Ok(mut clones) = self.clones.lock() {
            clones.push(StagedClone {
                url: url.to_string(),
                reference: reference.to_string(),
                credentials: credentials.cloned(),
            });
        }
        let source = self
            .trees
            .get(reference)
            .ok_or_else(|| format!("git clone of '{reference}' failed: remote branch not found"))?;
        copy_tree(source, dest)?;
        Ok(())
    }
}

fn copy_tree(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
