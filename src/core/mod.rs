//! Core types and traits for the docgate library.
//!
//! - [`types`] - `DocumentFormat`, `ScanOutcome`, `ThreatInfo`
//! - [`traits`] - the `MimeSniffer` and `MalwareScanner` capabilities
//! - [`error`] - the validation error taxonomy
//! - [`input`] - the `UploadedFile` under inspection
//! - [`hasher`] - streaming SHA-256 hashing
//! - [`result`] - `ValidationOutcome` and `ValidationReport`

pub mod error;
pub mod hasher;
pub mod input;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{
    ContentError, EmbeddedThreatError, ErrorKind, FilenameError, MimeError, PolicyError,
    ScanError, SignatureError, SizeError, StageResult, ValidationError,
};
pub use hasher::FileHasher;
pub use input::{extension_of, UploadedFile};
pub use result::{ValidationOutcome, ValidationReport};
pub use traits::{ArcScanner, ArcSniffer, MalwareScanner, MimeSniffer};
pub use types::{DocumentFormat, ScanOutcome, ThreatInfo};
