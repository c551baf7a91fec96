//! Capability implementations.
//!
//! This module contains implementations of the [`MimeSniffer`] and
//! [`MalwareScanner`] traits.
//!
//! ## Available Backends
//!
//! - [`sniffer`] - magic-byte MIME detection, plus null and fixed sniffers
//! - [`mock`] - A mock scanner for testing
//! - [`clamav`] - ClamAV via socket protocol (requires `clamav` feature)
//! - [`fail_closed`] - adapter that rejects files whose scan failed
//!
//! ## Implementing a Custom Backend
//!
//! To add a new scanning engine, implement the `MalwareScanner` trait:
//!
//! ```rust
//! use docgate::core::{MalwareScanner, ScanError, ScanOutcome};
//! use std::path::Path;
//!
//! #[derive(Debug)]
//! pub struct MyScanner;
//!
//! impl MalwareScanner for MyScanner {
//!     fn name(&self) -> &str {
//!         "my-scanner"
//!     }
//!
//!     fn scan(&self, _path: &Path) -> Result<ScanOutcome, ScanError> {
//!         Ok(ScanOutcome::Clean)
//!     }
//! }
//! ```
//!
//! [`MimeSniffer`]: crate::core::MimeSniffer
//! [`MalwareScanner`]: crate::core::MalwareScanner

pub mod fail_closed;
pub mod mock;
pub mod sniffer;

#[cfg(feature = "clamav")]
pub mod clamav;

// Re-exports
pub use fail_closed::FailClosed;
pub use mock::MockScanner;
pub use sniffer::{FixedSniffer, MagicSniffer, NullSniffer};

#[cfg(feature = "clamav")]
pub use clamav::{ClamAvConfig, ClamAvScanner};
