//! The uploaded file handed to the validator.
//!
//! `UploadedFile` is a read-only reference to a file the upload layer has
//! already written to disk. The validator never writes to it, moves it or
//! deletes it.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core::error::StageResult;

/// A file on disk together with the filename the uploader claimed for it.
///
/// # Examples
///
/// ```rust
/// use docgate::core::UploadedFile;
///
/// let file = UploadedFile::new("/tmp/upload-7f3a", "report.pdf", 2048);
/// assert_eq!(file.declared_filename(), "report.pdf");
/// assert_eq!(file.extension().as_deref(), Some(".pdf"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    path: PathBuf,
    declared_filename: String,
    byte_length: u64,
}

impl UploadedFile {
    /// Creates an `UploadedFile` with an explicitly known size.
    pub fn new(
        path: impl Into<PathBuf>,
        declared_filename: impl Into<String>,
        byte_length: u64,
    ) -> Self {
        Self {
            path: path.into(),
            declared_filename: declared_filename.into(),
            byte_length,
        }
    }

    /// Creates an `UploadedFile`, taking the size from a filesystem stat.
    pub fn from_path(
        path: impl Into<PathBuf>,
        declared_filename: impl Into<String>,
    ) -> std::io::Result<Self> {
        let path = path.into();
        let byte_length = std::fs::metadata(&path)?.len();
        Ok(Self {
            path,
            declared_filename: declared_filename.into(),
            byte_length,
        })
    }

    /// Returns the on-disk location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the filename as supplied by the uploader.
    pub fn declared_filename(&self) -> &str {
        &self.declared_filename
    }

    /// Returns the size in bytes.
    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// Returns the lower-cased last extension of the declared filename,
    /// including the leading dot.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.declared_filename)
    }

    /// Reads at most `limit` bytes from the start of the file.
    pub fn read_prefix(&self, limit: usize) -> StageResult<Vec<u8>> {
        read_prefix(&self.path, limit)
    }
}

/// Returns the lower-cased last extension of `filename` with its dot.
///
/// A name whose only dot is the leading one (`.bashrc`) has no extension.
pub fn extension_of(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    match base.rfind('.') {
        Some(idx) if idx > 0 => Some(base[idx..].to_ascii_lowercase()),
        _ => None,
    }
}

/// Reads at most `limit` bytes from the start of the file at `path`.
pub fn read_prefix(path: &Path, limit: usize) -> StageResult<Vec<u8>> {
    let file = File::open(path)?;
    let mut buf = Vec::with_capacity(limit.min(64 * 1024));
    file.take(limit as u64).read_to_end(&mut buf)?;
    Ok(buf)
}
