//! Fail-closed adapter for malware scanners.

use std::path::Path;

use crate::core::{MalwareScanner, ScanError, ScanOutcome, ThreatInfo};

/// Wraps a scanner so that a failed scan counts as an infected verdict.
///
/// The validator treats scanner errors as a warning and accepts the file.
/// Deployments that must not accept unscanned files wrap their engine in
/// `FailClosed`; the upload is then rejected with `MalwareDetected` naming
/// the failure.
///
/// # Example
///
/// ```rust
/// use docgate::backends::{FailClosed, MockScanner};
/// use docgate::core::MalwareScanner;
/// use std::path::Path;
///
/// let scanner = FailClosed::new(MockScanner::failing("daemon down"));
/// let outcome = scanner.scan(Path::new("/tmp/upload")).unwrap();
/// assert!(outcome.is_infected());
/// ```
#[derive(Debug)]
pub struct FailClosed<S> {
    inner: S,
}

impl<S: MalwareScanner> FailClosed<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Returns the wrapped scanner.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwraps the adapter.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MalwareScanner> MalwareScanner for FailClosed<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        match self.inner.scan(path) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!(engine = %self.inner.name(), error = %e, "scan failed; treating file as infected");
                Ok(ScanOutcome::Infected {
                    threats: vec![ThreatInfo::new(
                        format!("unverified ({})", e),
                        self.inner.name(),
                    )],
                })
            }
        }
    }

    fn health_check(&self) -> Result<(), ScanError> {
        self.inner.health_check()
    }
}
