//! Mock scanner for testing.
//!
//! This module provides a configurable mock scanner that can be used
//! in tests to simulate clean, infected and failing engines without
//! requiring a real scanning engine.

use crate::core::{FileHasher, MalwareScanner, ScanError, ScanOutcome};

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// What the mock does when no per-file response matches.
#[derive(Debug, Clone)]
enum Behavior {
    Outcome(ScanOutcome),
    Fail(String),
}

/// A mock scanner for testing purposes.
///
/// The mock scanner can be configured to return specific outcomes
/// for specific file hashes, or a default behavior for unknown files.
///
/// # Examples
///
/// ```rust
/// use docgate::backends::MockScanner;
/// use docgate::core::ScanOutcome;
/// use std::time::Duration;
///
/// // Reports all files as clean
/// let scanner = MockScanner::clean();
///
/// // Reports all files as infected
/// let scanner = MockScanner::infected("Eicar-Test-Signature");
///
/// // Custom response for one file hash (SHA-256, hex)
/// let scanner = MockScanner::new()
///     .with_response("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9", ScanOutcome::infected("Test.Malware", "mock"))
///     .with_latency(Duration::from_millis(5));
/// ```
#[derive(Debug)]
pub struct MockScanner {
    /// Name of this scanner instance.
    name: String,
    /// Responses keyed by file hash (SHA-256).
    responses: HashMap<String, ScanOutcome>,
    /// Behavior for files not in the response map.
    default_behavior: Behavior,
    /// Simulated latency for scans.
    latency: Option<Duration>,
    /// Counter for scan operations.
    scan_count: AtomicU64,
    /// Whether to fail health checks.
    unhealthy: AtomicBool,
}

impl MockScanner {
    /// Creates a new mock scanner that reports every file clean.
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: HashMap::new(),
            default_behavior: Behavior::Outcome(ScanOutcome::Clean),
            latency: None,
            scan_count: AtomicU64::new(0),
            unhealthy: AtomicBool::new(false),
        }
    }

    /// Creates a mock scanner that always reports clean.
    pub fn clean() -> Self {
        Self::new()
    }

    /// Creates a mock scanner that reports every file infected with `threat`.
    pub fn infected(threat: impl Into<String>) -> Self {
        Self::with_outcome(ScanOutcome::infected(threat, "mock"))
    }

    /// Creates a mock scanner that returns `outcome` for every file.
    pub fn with_outcome(outcome: ScanOutcome) -> Self {
        Self {
            default_behavior: Behavior::Outcome(outcome),
            ..Self::new()
        }
    }

    /// Creates a mock scanner whose scans always fail with
    /// `ScanError::EngineUnavailable`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            default_behavior: Behavior::Fail(reason.into()),
            ..Self::new()
        }
    }

    /// Sets the name of this scanner.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a response for a specific file hash.
    pub fn with_response(mut self, hash: impl Into<String>, outcome: ScanOutcome) -> Self {
        self.responses.insert(hash.into(), outcome);
        self
    }

    /// Sets the simulated latency for scans.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns the number of scans performed.
    pub fn scan_count(&self) -> u64 {
        self.scan_count.load(Ordering::Relaxed)
    }

    /// Sets the health status.
    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::Relaxed);
    }

    fn lookup(&self, path: &Path) -> Result<Option<ScanOutcome>, ScanError> {
        if self.responses.is_empty() {
            return Ok(None);
        }
        let mut file = File::open(path)?;
        let hash = FileHasher::new()
            .hash_reader(&mut file)
            .map_err(|e| ScanError::engine_unavailable(&self.name, e.to_string()))?;
        Ok(self.responses.get(&hash).cloned())
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MalwareScanner for MockScanner {
    fn name(&self) -> &str {
        &self.name
    }

    fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        self.scan_count.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        if let Some(outcome) = self.lookup(path)? {
            return Ok(outcome);
        }

        match &self.default_behavior {
            Behavior::Outcome(outcome) => Ok(outcome.clone()),
            Behavior::Fail(reason) => Err(ScanError::engine_unavailable(&self.name, reason)),
        }
    }

    fn health_check(&self) -> Result<(), ScanError> {
        if self.unhealthy.load(Ordering::Relaxed) {
            Err(ScanError::engine_unavailable(&self.name, "marked unhealthy"))
        } else {
            Ok(())
        }
    }
}
