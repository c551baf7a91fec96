//! The validation stages, in pipeline order.
//!
//! Every stage returns `StageResult` and appends non-fatal findings to the
//! caller's warning list. A stage never panics on malformed input; I/O
//! failures surface as `ValidationError::Structural`.
//!
//! - [`filename`] - unsafe declared names
//! - [`gates`] - size bounds and the extension allowlist
//! - [`mime`] - content-sniffed MIME cross-check
//! - [`signature`] - magic-byte blocklist and per-format headers
//! - [`container`] - DOCX package structure
//! - [`content`] - bounded prefix scan
//! - [`embedded`] - deep PDF/DOCX feature inspection
//! - [`malware`] - the optional malware-scan gateway
//! - [`sanitize`] - storage-safe filename

use memchr::memmem;

pub mod container;
pub mod content;
pub mod embedded;
pub mod filename;
pub mod gates;
pub mod malware;
pub mod mime;
pub mod sanitize;
pub mod signature;

pub use container::{inspect_docx_structure, ContainerDefect};
pub use content::ContentScanner;
pub use embedded::{inspect_docx_entries, inspect_pdf_features};
pub use filename::check_filename;
pub use gates::{check_extension, check_size};
pub use malware::run_malware_scan;
pub use mime::check_mime;
pub use sanitize::{sanitize_filename, sanitize_filename_with};
pub use signature::check_signature;

/// Returns `true` if `needle` occurs anywhere in `haystack`.
pub(crate) fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    memmem::find(haystack, needle).is_some()
}
