//! ClamAV scanning backend.
//!
//! This module provides a scanner implementation that communicates with
//! ClamAV via its socket protocol (clamd).
//!
//! # Requirements
//!
//! - ClamAV daemon (clamd) must be running
//! - Access to the clamd socket (Unix socket or TCP)
//!
//! # Protocol
//!
//! Uses the `zINSTREAM` command to send file data for scanning: a stream of
//! big-endian length-prefixed chunks ended by a zero-length chunk. The
//! daemon answers with one NUL-terminated line.

use crate::core::{MalwareScanner, ScanError, ScanOutcome};

use std::fs::File;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENGINE: &str = "clamav";

/// ClamAV scanner configuration.
#[derive(Debug, Clone)]
pub struct ClamAvConfig {
    /// Path to the Unix socket.
    pub socket_path: Option<PathBuf>,

    /// TCP host and port (alternative to socket).
    pub tcp_address: Option<String>,

    /// Connection timeout (TCP only).
    pub connection_timeout: Duration,

    /// Read and write timeout for a whole scan exchange.
    pub scan_timeout: Duration,

    /// Size of each INSTREAM chunk.
    pub chunk_size: usize,
}

impl Default for ClamAvConfig {
    fn default() -> Self {
        Self {
            socket_path: Some(PathBuf::from("/var/run/clamav/clamd.sock")),
            tcp_address: None,
            connection_timeout: Duration::from_secs(10),
            scan_timeout: Duration::from_secs(300),
            chunk_size: 8192,
        }
    }
}

impl ClamAvConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a Unix socket.
    pub fn with_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self.tcp_address = None;
        self
    }

    /// Uses a TCP connection.
    pub fn with_tcp(mut self, address: impl Into<String>) -> Self {
        self.tcp_address = Some(address.into());
        self.socket_path = None;
        self
    }

    /// Sets the connection timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the scan timeout.
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// Sets the INSTREAM chunk size.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }
}

/// A connected clamd socket.
trait Connection: Read + Write {}

impl<T: Read + Write> Connection for T {}

/// ClamAV scanner implementation.
///
/// Communicates with the ClamAV daemon using the INSTREAM protocol. Calls
/// block; the socket timeouts in [`ClamAvConfig`] bound them.
///
/// # Example
///
/// ```rust,no_run
/// use docgate::backends::clamav::{ClamAvConfig, ClamAvScanner};
/// use docgate::core::MalwareScanner;
///
/// let config = ClamAvConfig::new()
///     .with_socket("/var/run/clamav/clamd.sock");
///
/// let scanner = ClamAvScanner::new(config)?;
/// scanner.health_check()?;
/// # Ok::<(), docgate::core::ScanError>(())
/// ```
#[derive(Debug)]
pub struct ClamAvScanner {
    config: ClamAvConfig,
}

impl ClamAvScanner {
    /// Creates a new ClamAV scanner with the given configuration.
    pub fn new(config: ClamAvConfig) -> Result<Self, ScanError> {
        if config.socket_path.is_none() && config.tcp_address.is_none() {
            return Err(ScanError::configuration(
                "Either socket_path or tcp_address must be specified",
            ));
        }
        if config.chunk_size == 0 {
            return Err(ScanError::configuration("chunk_size must be positive"));
        }

        Ok(Self { config })
    }

    /// Creates a ClamAV scanner with default configuration.
    pub fn with_defaults() -> Result<Self, ScanError> {
        Self::new(ClamAvConfig::default())
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClamAvConfig {
        &self.config
    }

    fn connect(&self) -> Result<Box<dyn Connection>, ScanError> {
        if let Some(ref socket_path) = self.config.socket_path {
            return self.connect_unix(socket_path);
        }
        if let Some(ref address) = self.config.tcp_address {
            let addr = address
                .to_socket_addrs()
                .map_err(|e| ScanError::configuration(format!("bad clamd address {}: {}", address, e)))?
                .next()
                .ok_or_else(|| ScanError::configuration(format!("clamd address {} did not resolve", address)))?;
            let stream = TcpStream::connect_timeout(&addr, self.config.connection_timeout)
                .map_err(|e| ScanError::engine_unavailable(ENGINE, e.to_string()))?;
            stream.set_read_timeout(Some(self.config.scan_timeout))?;
            stream.set_write_timeout(Some(self.config.scan_timeout))?;
            return Ok(Box::new(stream));
        }
        Err(ScanError::configuration("No connection method configured"))
    }

    #[cfg(unix)]
    fn connect_unix(&self, socket_path: &Path) -> Result<Box<dyn Connection>, ScanError> {
        let stream = std::os::unix::net::UnixStream::connect(socket_path)
            .map_err(|e| ScanError::engine_unavailable(ENGINE, e.to_string()))?;
        stream.set_read_timeout(Some(self.config.scan_timeout))?;
        stream.set_write_timeout(Some(self.config.scan_timeout))?;
        Ok(Box::new(stream))
    }

    #[cfg(not(unix))]
    fn connect_unix(&self, _socket_path: &Path) -> Result<Box<dyn Connection>, ScanError> {
        Err(ScanError::configuration(
            "Unix sockets not supported on this platform",
        ))
    }

    /// Streams `reader` to clamd and returns its raw reply.
    fn instream(&self, reader: &mut dyn Read) -> Result<String, ScanError> {
        let mut stream = self.connect()?;
        let failed = |e: std::io::Error| ScanError::connection_failed(ENGINE, e.to_string());

        stream.write_all(b"zINSTREAM\0").map_err(failed)?;

        let mut chunk = vec![0u8; self.config.chunk_size];
        loop {
            let read = reader.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            let len = read as u32;
            stream.write_all(&len.to_be_bytes()).map_err(failed)?;
            stream.write_all(&chunk[..read]).map_err(failed)?;
        }

        // Zero-length chunk ends the stream
        stream.write_all(&0u32.to_be_bytes()).map_err(failed)?;
        stream.flush().map_err(failed)?;

        let mut response = String::new();
        stream.read_to_string(&mut response).map_err(failed)?;
        Ok(response)
    }

    /// Parses a ClamAV response into a scan outcome.
    fn parse_response(response: &str) -> Result<ScanOutcome, ScanError> {
        let response = response.trim_matches(|c: char| c == '\0' || c.is_whitespace());

        if response.ends_with("OK") {
            Ok(ScanOutcome::Clean)
        } else if let Some(rest) = response.strip_suffix("FOUND") {
            // "stream: Eicar-Test-Signature FOUND"
            let threat_name = rest
                .split_once(':')
                .map(|(_, name)| name.trim())
                .filter(|name| !name.is_empty())
                .unwrap_or("Unknown");
            Ok(ScanOutcome::infected(threat_name, ENGINE))
        } else if response.ends_with("ERROR") {
            Err(ScanError::engine_unavailable(ENGINE, response))
        } else {
            Err(ScanError::AmbiguousResponse {
                engine: ENGINE.to_string(),
                details: response.to_string(),
            })
        }
    }
}

impl MalwareScanner for ClamAvScanner {
    fn name(&self) -> &str {
        ENGINE
    }

    fn scan(&self, path: &Path) -> Result<ScanOutcome, ScanError> {
        let mut file = File::open(path)?;
        let response = self.instream(&mut file)?;
        let outcome = Self::parse_response(&response)?;
        tracing::debug!(path = %path.display(), clean = outcome.is_clean(), "clamd verdict");
        Ok(outcome)
    }

    fn health_check(&self) -> Result<(), ScanError> {
        let mut stream = self.connect()?;
        let failed = |e: std::io::Error| ScanError::connection_failed(ENGINE, e.to_string());

        stream.write_all(b"zPING\0").map_err(failed)?;
        let mut response = String::new();
        stream.read_to_string(&mut response).map_err(failed)?;

        if response.trim_matches(|c: char| c == '\0' || c.is_whitespace()) == "PONG" {
            Ok(())
        } else {
            Err(ScanError::engine_unavailable(
                ENGINE,
                format!("Unexpected response: {}", response),
            ))
        }
    }
}
