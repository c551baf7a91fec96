//! Capability traits injected into the validator.
//!
//! Both capabilities are optional at deployment time: a validator can run
//! without a real MIME sniffer (it degrades to a warning) and without a
//! malware scanner (scanning is gated by policy). They are traits so that
//! tests and deployments can swap implementations freely.

use crate::core::error::ScanError;
use crate::core::types::ScanOutcome;

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

/// Content-based MIME type detection.
///
/// # Implementation Notes
///
/// - `sniff` inspects file bytes, never the filename.
/// - Returning `None` means "could not determine"; it is not an error.
/// - An implementation that cannot detect anything at all (for example
///   because a native library is missing) reports `is_available() == false`
///   so the validator can say so in its warnings.
pub trait MimeSniffer: Send + Sync + Debug {
    /// Returns a stable name for logs.
    fn name(&self) -> &str;

    /// Detects the MIME type of the file at `path`.
    fn sniff(&self, path: &Path) -> Option<String>;

    /// Returns `false` if this sniffer never produces a result.
    fn is_available(&self) -> bool {
        true
    }
}

/// The core trait for malware scanning engines.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync`; one scanner is shared by all
///   concurrent validations.
/// - `scan` may block. The validator imposes no timeout; engines should
///   configure their own I/O timeouts.
/// - Implementations should never panic; failures are returned as
///   `ScanError` and the validator decides what to do with them.
pub trait MalwareScanner: Send + Sync + Debug {
    /// Returns the name of this scanner engine, like "clamav".
    fn name(&self) -> &str;

    /// Scans the file at `path`.
    ///
    /// # Errors
    ///
    /// - `EngineUnavailable` - the engine is not running or reachable.
    /// - `ConnectionFailed` - socket I/O with the engine failed.
    /// - `AmbiguousResponse` - the engine answered something unparseable.
    /// - `Io` - the file could not be read.
    fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError>;

    /// Performs a lightweight reachability check.
    fn health_check(&self) -> Result<(), ScanError> {
        Ok(())
    }
}

/// A shared MIME sniffer.
pub type ArcSniffer = Arc<dyn MimeSniffer>;

/// A shared malware scanner.
pub type ArcScanner = Arc<dyn MalwareScanner>;
