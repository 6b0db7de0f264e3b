//! Filesystem port for file I/O operations.

use std::path::Path;

/// Provides filesystem access for reading trees and writing reports.
///
/// Abstracting the filesystem lets tests inject read failures and run the
/// comparison against in-memory trees.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read(&self, path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Ok(String::from_utf8(self.read(path)?)?)
    }

    /// Returns the length of a file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be inspected.
    fn file_len(&self, path: &Path) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.read(path)?.len() as u64)
    }

    /// Writes the given contents to a file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if the path exists on the filesystem.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists every regular file under `root`, recursively.
    ///
    /// Paths are relative to `root`, use `/` separators, and are sorted
    /// byte-wise. Directories whose name appears in `exclude_dirs` are
    /// skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns an error if `root`, or any directory beneath it that is not
    /// excluded, cannot be enumerated. A partial listing is never returned.
    fn list_files(
        &self,
        root: &Path,
        exclude_dirs: &[String],
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Removes a directory and everything beneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be removed.
    fn remove_dir_all(&self, path: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
