//! # Docgate
//!
//! Pre-ingestion security validation for uploaded documents.
//!
//! ## Overview
//!
//! Docgate decides whether an uploaded file is safe to hand to a document
//! parser and to storage. It runs a fixed pipeline of checks and returns
//! either an accepted outcome with a storage-safe filename or a rejection
//! naming the first failing check:
//!
//! 1. Filename safety (traversal, NUL, reserved names, double extensions)
//! 2. Size bounds
//! 3. Extension allowlist
//! 4. Content-sniffed MIME cross-check
//! 5. Magic-byte signatures, with a DOCX container check
//! 6. A bounded scan of the first 2 MiB of content
//! 7. Deep PDF feature and DOCX entry inspection
//! 8. An optional malware scan (fail-open)
//! 9. Filename sanitization
//!
//! Warnings from passing checks accumulate and are returned either way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgate::core::UploadedFile;
//! use docgate::FileValidator;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let validator = FileValidator::with_defaults()?;
//!
//!     let file = UploadedFile::from_path("/tmp/upload-7f3a", "report.pdf")?;
//!     let outcome = validator.validate(&file);
//!
//!     if outcome.is_valid() {
//!         println!("store as {:?}", outcome.sanitized_filename());
//!     } else {
//!         println!("rejected: {:?}", outcome.error_message());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes tokio runtime support and the ClamAV backend
//! - `tokio-runtime` - [`validate_with_timeout`] for async callers
//! - `clamav` - ClamAV backend support
//!
//! ## Architecture
//!
//! - **Core**: Fundamental types, traits, and error handling
//! - **Policy**: The tunable tables every check reads
//! - **Stages**: One module per pipeline check
//! - **Backends**: MIME sniffers and malware scanners
//! - **Validator**: The pipeline itself
//! - **Audit**: Structured logging of each validation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod backends;
pub mod core;
pub mod policy;
pub mod stages;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types at the crate root
pub use crate::core::{
    ErrorKind, FileHasher, MalwareScanner, MimeSniffer, PolicyError, ScanError, ScanOutcome,
    UploadedFile, ValidationError, ValidationOutcome, ValidationReport,
};

pub use crate::policy::ValidationPolicy;
pub use crate::stages::{sanitize_filename, sanitize_filename_with};
pub use crate::validator::{FileValidator, FileValidatorBuilder};

#[cfg(feature = "tokio-runtime")]
pub use crate::validator::validate_with_timeout;

/// Prelude module for convenient imports.
///
/// ```rust
/// use docgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backends::{MagicSniffer, MockScanner, NullSniffer};
    pub use crate::core::{
        ErrorKind, FileHasher, MalwareScanner, MimeSniffer, ScanError, ScanOutcome, ThreatInfo,
        UploadedFile, ValidationError, ValidationOutcome, ValidationReport,
    };
    pub use crate::policy::ValidationPolicy;
    pub use crate::validator::{FileValidator, FileValidatorBuilder};
}
