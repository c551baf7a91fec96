//! MIME sniffers.
//!
//! [`MagicSniffer`] recognizes the formats the default policy cares about
//! from their leading bytes, plus the executable and image types most often
//! disguised as documents. It is not a general-purpose libmagic.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::core::MimeSniffer;
use crate::policy::table::{DOCX_MIME, ZIP_LOCAL_HEADER};

/// How many leading bytes the magic sniffer looks at.
const SNIFF_LEN: usize = 8 * 1024;

const OLE2_MAGIC: &[u8] = b"\xd0\xcf\x11\xe0\xa1\xb1\x1a\xe1";

/// Simple leading-byte rules, checked in order.
const MAGIC_RULES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (OLE2_MAGIC, "application/msword"),
    (b"{\\rtf", "application/rtf"),
    (b"MZ", "application/x-dosexec"),
    (b"\x7fELF", "application/x-executable"),
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
];

/// Detects MIME types from magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicSniffer;

impl MagicSniffer {
    /// Creates a new magic-byte sniffer.
    pub fn new() -> Self {
        Self
    }

    fn detect(&self, path: &Path) -> std::io::Result<String> {
        let mut head = Vec::with_capacity(SNIFF_LEN);
        File::open(path)?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)?;

        if head.is_empty() {
            return Ok("application/x-empty".to_string());
        }
        if head.starts_with(ZIP_LOCAL_HEADER) {
            return Ok(sniff_zip(path).to_string());
        }
        if let Some((_, mime)) = MAGIC_RULES.iter().find(|(magic, _)| head.starts_with(magic)) {
            return Ok((*mime).to_string());
        }
        if looks_like_text(&head, head.len() == SNIFF_LEN) {
            return Ok("text/plain".to_string());
        }
        Ok("application/octet-stream".to_string())
    }
}

impl MimeSniffer for MagicSniffer {
    fn name(&self) -> &str {
        "magic"
    }

    fn sniff(&self, path: &Path) -> Option<String> {
        match self.detect(path) {
            Ok(mime) => Some(mime),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "MIME sniffing failed");
                None
            }
        }
    }
}

/// A ZIP is DOCX when it holds `word/` entries.
fn sniff_zip(path: &Path) -> &'static str {
    let archive = File::open(path)
        .ok()
        .and_then(|file| zip::ZipArchive::new(BufReader::new(file)).ok());
    match archive {
        Some(archive) if archive.file_names().any(|name| name.starts_with("word/")) => DOCX_MIME,
        _ => "application/zip",
    }
}

/// UTF-8 without NUL. A sequence cut by the sniff window still counts.
fn looks_like_text(head: &[u8], truncated: bool) -> bool {
    if head.contains(&0) {
        return false;
    }
    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => truncated && e.error_len().is_none(),
    }
}

/// A sniffer for deployments without content detection.
///
/// Always unavailable, so the MIME stage is skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSniffer;

impl MimeSniffer for NullSniffer {
    fn name(&self) -> &str {
        "null"
    }

    fn sniff(&self, _path: &Path) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// A sniffer that reports the same answer for every file.
///
/// Useful in tests and when the upload layer already ran detection.
#[derive(Debug, Clone, Default)]
pub struct FixedSniffer {
    mime: Option<String>,
}

impl FixedSniffer {
    /// Always reports `mime`.
    pub fn new(mime: impl Into<String>) -> Self {
        Self {
            mime: Some(mime.into()),
        }
    }

    /// Always reports "could not determine".
    pub fn none() -> Self {
        Self { mime: None }
    }
}

impl MimeSniffer for FixedSniffer {
    fn name(&self) -> &str {
        "fixed"
    }

    fn sniff(&self, _path: &Path) -> Option<String> {
        self.mime.clone()
    }
}
