//! Byte size and token estimation for files.

use std::path::Path;

use crate::ports::filesystem::FileSystem;

/// Bytes per token used by the estimate. Not a real tokenizer.
pub const BYTES_PER_TOKEN: u64 = 4;

/// Size of a file and the approximate number of model tokens it would use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeEstimate {
    /// Content length in bytes.
    pub size_bytes: u64,
    /// `ceil(size_bytes / 4)`.
    pub token_estimate: u64,
}

impl SizeEstimate {
    /// Builds an estimate from a known content length.
    #[must_use]
    pub fn from_len(size_bytes: u64) -> Self {
        Self { size_bytes, token_estimate: size_bytes.div_ceil(BYTES_PER_TOKEN) }
    }

    /// Size in kilobytes, rounded to two decimal places.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn size_kb(&self) -> f64 {
        (self.size_bytes as f64 / 1024.0 * 100.0).round() / 100.0
    }
}

/// Estimates the size of the file at `path` from its length, without reading it.
///
/// A missing or uninspectable file yields `{0, 0}` rather than an error.
#[must_use]
pub fn estimate(fs: &dyn FileSystem, path: &Path) -> SizeEstimate {
    match fs.file_len(path) {
        Ok(len) => SizeEstimate::from_len(len),
        Err(e) => {
            log::debug!("size estimate for {} defaulted to zero: {e}", path.display());
            SizeEstimate::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::live::filesystem::LiveFileSystem;

    #[test]
    fn thousand_bytes_is_250_tokens() {
        assert_eq!(SizeEstimate::from_len(1000).token_estimate, 250);
    }

    #[test]
    fn zero_bytes_is_zero_tokens() {
        assert_eq!(SizeEstimate::from_len(0), SizeEstimate { size_bytes: 0, token_estimate: 0 });
    }

    #[test]
    fn partial_token_rounds_up() {
        assert_eq!(SizeEstimate::from_len(1).token_estimate, 1);
        assert_eq!(SizeEstimate::from_len(5).token_estimate, 2);
        assert_eq!(SizeEstimate::from_len(8).token_estimate, 2);
    }

    #[test]
    fn size_kb_rounds_to_two_places() {
        assert!((SizeEstimate::from_len(1024).size_kb() - 1.0).abs() < f64::EPSILON);
        assert!((SizeEstimate::from_len(1536).size_kb() - 1.5).abs() < f64::EPSILON);
        assert!((SizeEstimate::from_len(100).size_kb() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_estimates_zero() {
        let dir = tempfile::tempdir().unwrap();
        let est = estimate(&LiveFileSystem, &dir.path().join("nope.txt"));
        assert_eq!(est, SizeEstimate::default());
    }

    #[test]
    fn estimate_reads_file_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, vec![b'x'; 1000]).unwrap();
        let est = estimate(&LiveFileSystem, &path);
        assert_eq!(est.size_bytes, 1000);
        assert_eq!(est.token_estimate, 250);
    }
}
