//! Streaming SHA-256 content hashing.
//!
//! The digest is the content address of an accepted upload: the ingestion
//! service uses it for deduplication and the audit trail. Files are read in
//! fixed-size chunks so memory stays bounded regardless of file size.

use crate::core::error::ValidationError;

use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Default chunk size for streaming reads.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024;

/// Computes lowercase hex SHA-256 digests of files and byte slices.
///
/// # Examples
///
/// ```rust
/// use docgate::core::FileHasher;
///
/// let hasher = FileHasher::new();
/// assert_eq!(
///     hasher.hash_bytes(b"abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct FileHasher {
    chunk_size: usize,
}

impl Default for FileHasher {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FileHasher {
    /// Creates a hasher with the default 4 KiB chunk size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the read chunk size. Zero is treated as one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Returns the configured chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hashes an in-memory buffer.
    pub fn hash_bytes(&self, data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Hashes the file at `path` by streaming it.
    pub fn hash_file(&self, path: &Path) -> Result<String, ValidationError> {
        let mut file = std::fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ValidationError::structural(format!("file not found: {}", path.display()))
            } else {
                ValidationError::from(e)
            }
        })?;
        self.hash_reader(&mut file)
    }

    /// Hashes everything a reader yields.
    pub fn hash_reader<R: Read>(&self, reader: &mut R) -> Result<String, ValidationError> {
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            hasher.update(&buffer[..bytes_read]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}
