//! Error types for the docgate library.
//!
//! Every anticipated way an upload can fail validation is a variant of
//! [`ValidationError`] and is returned as data. Faults in the injected
//! capabilities use [`ScanError`], and invalid policies use [`PolicyError`].

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The terminal error of a rejected upload.
///
/// The `Display` text is what the ingestion service shows to the uploader,
/// so it is written for humans and carries the relevant values.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ValidationError {
    /// The file is missing or could not be read.
    #[error("file could not be processed: {message}")]
    Structural {
        /// Underlying failure message.
        message: String,
    },

    /// The file is outside the configured size bounds.
    #[error(transparent)]
    Size(#[from] SizeError),

    /// The declared filename is unsafe.
    #[error(transparent)]
    Filename(#[from] FilenameError),

    /// The extension is not in the allowlist.
    #[error("File extension '{extension}' not allowed. Allowed extensions: {allowed}")]
    Extension {
        /// The rejected extension (lower-cased, with leading dot).
        extension: String,
        /// Comma-separated allowlist.
        allowed: String,
    },

    /// The sniffed MIME type is not acceptable.
    #[error(transparent)]
    Mime(#[from] MimeError),

    /// The leading bytes identify a forbidden or mismatched format.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// A container format (DOCX) is missing required parts.
    #[error("Invalid document structure: {reason}")]
    ContainerStructure {
        /// What is missing or broken.
        reason: String,
    },

    /// The content prefix holds a dangerous pattern.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The document carries a dangerous embedded feature.
    #[error(transparent)]
    EmbeddedThreat(#[from] EmbeddedThreatError),

    /// The malware scanner reported the file as infected.
    #[error("Malware detected: {threats}")]
    MalwareDetected {
        /// Threat names reported by the engine.
        threats: String,
    },
}

/// Size bound violations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SizeError {
    /// Larger than `max_file_size_bytes`.
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    TooLarge {
        /// Actual size.
        size: u64,
        /// Configured limit.
        max: u64,
    },

    /// Smaller than `min_file_size_bytes`.
    #[error("File too small: {size} bytes (min: {min} bytes)")]
    TooSmall {
        /// Actual size.
        size: u64,
        /// Configured limit.
        min: u64,
    },
}

/// Unsafe filenames.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FilenameError {
    /// Contains `../`, `..\`, `./` or `.\`.
    #[error("Path traversal detected in filename")]
    PathTraversal,

    /// Contains a NUL byte.
    #[error("Null byte detected in filename")]
    NullByte,

    /// The stem is a Windows device name.
    #[error("Reserved filename: {stem}")]
    ReservedName {
        /// The offending stem.
        stem: String,
    },

    /// Longer than 255 characters.
    #[error("Filename too long: {length} characters (max: {max})")]
    NameTooLong {
        /// Actual length.
        length: usize,
        /// Limit.
        max: usize,
    },

    /// A secondary extension is executable.
    #[error("Suspicious double extension detected: {extension}")]
    SuspiciousDoubleExtension {
        /// The dangerous secondary extension.
        extension: String,
    },
}

/// MIME cross-check failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum MimeError {
    /// Detected type is not in the global allowlist.
    #[error("File type '{detected}' not allowed")]
    Disallowed {
        /// Detected MIME type.
        detected: String,
    },

    /// Detected type does not fit the extension.
    #[error("File content ({detected}) doesn't match extension ({extension})")]
    ExtensionMismatch {
        /// Detected MIME type.
        detected: String,
        /// Declared extension.
        extension: String,
    },
}

/// Magic-byte failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SignatureError {
    /// Matched the dangerous-signature blocklist.
    #[error("Dangerous file type detected: {description}")]
    Dangerous {
        /// Blocklist description, e.g. `Executable file (PE)`.
        description: String,
    },

    /// The header does not match the declared format.
    #[error("Invalid {format} file signature")]
    InvalidFormatSignature {
        /// Declared format, e.g. `PDF`.
        format: String,
    },

    /// A ZIP archive was uploaded under a non-container extension.
    #[error("ZIP archive not allowed for {extension} files")]
    ZipNotAllowed {
        /// Declared extension.
        extension: String,
    },
}

/// Content prefix findings.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ContentError {
    /// A dangerous substring was found in a text file.
    #[error("Potentially malicious content detected: {description}")]
    MaliciousPattern {
        /// Pattern description.
        description: String,
    },

    /// A URL pointing at an executable was found.
    #[error("Suspicious URL pointing to executable file detected")]
    SuspiciousUrl,

    /// A text file holds binary data.
    #[error("Binary content detected in text file")]
    BinaryInText,

    /// A text file is not valid UTF-8.
    #[error("Invalid text encoding: {detail}")]
    InvalidEncoding {
        /// Decoder message.
        detail: String,
    },

    /// An executable image is embedded in the document.
    #[error("Embedded executable detected: {description}")]
    EmbeddedExecutable {
        /// Which marker was found.
        description: String,
    },
}

/// Deep per-format findings.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum EmbeddedThreatError {
    /// The PDF uses a feature that can run or pull external content.
    #[error("PDF contains dangerous feature: {feature} ({description})")]
    DangerousPdfFeature {
        /// PDF name, e.g. `/Launch`.
        feature: String,
        /// What it does.
        description: String,
    },

    /// The document carries VBA macros.
    #[error("Documents with macros are not allowed")]
    MacrosNotAllowed,
}

/// Flat classification of a [`ValidationError`], for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// File missing or unreadable.
    StructuralError,
    /// Size bounds.
    SizeError,
    /// Filename checks.
    FilenameError,
    /// Extension allowlist.
    ExtensionError,
    /// MIME checks.
    MimeError,
    /// Magic bytes.
    SignatureError,
    /// Container structure.
    ContainerStructureError,
    /// Content prefix.
    ContentPatternError,
    /// Embedded features.
    EmbeddedThreatError,
    /// Malware scanner verdict.
    MalwareDetected,
}

impl ErrorKind {
    /// Returns the snake_case name used in audit logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuralError => "structural_error",
            Self::SizeError => "size_error",
            Self::FilenameError => "filename_error",
            Self::ExtensionError => "extension_error",
            Self::MimeError => "mime_error",
            Self::SignatureError => "signature_error",
            Self::ContainerStructureError => "container_structure_error",
            Self::ContentPatternError => "content_pattern_error",
            Self::EmbeddedThreatError => "embedded_threat_error",
            Self::MalwareDetected => "malware_detected",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValidationError {
    /// Returns the flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structural { .. } => ErrorKind::StructuralError,
            Self::Size(_) => ErrorKind::SizeError,
            Self::Filename(_) => ErrorKind::FilenameError,
            Self::Extension { .. } => ErrorKind::ExtensionError,
            Self::Mime(_) => ErrorKind::MimeError,
            Self::Signature(_) => ErrorKind::SignatureError,
            Self::ContainerStructure { .. } => ErrorKind::ContainerStructureError,
            Self::Content(_) => ErrorKind::ContentPatternError,
            Self::EmbeddedThreat(_) => ErrorKind::EmbeddedThreatError,
            Self::MalwareDetected { .. } => ErrorKind::MalwareDetected,
        }
    }

    /// Creates a `Structural` error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Creates a `ContainerStructure` error.
    pub fn container(reason: impl Into<String>) -> Self {
        Self::ContainerStructure {
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ValidationError {
    fn from(err: std::io::Error) -> Self {
        Self::structural(err.to_string())
    }
}

impl From<zip::result::ZipError> for ValidationError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::structural(err.to_string())
    }
}

/// Errors raised by the injected malware-scan capability.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scanning engine is unavailable or not responding.
    #[error("engine '{engine}' is unavailable: {reason}")]
    EngineUnavailable {
        /// Name of the engine.
        engine: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Failed to connect to the scanning engine.
    #[error("connection to engine '{engine}' failed: {message}")]
    ConnectionFailed {
        /// Name of the engine.
        engine: String,
        /// Error message describing the failure.
        message: String,
    },

    /// The engine returned a response that could not be interpreted.
    #[error("ambiguous response from engine '{engine}': {details}")]
    AmbiguousResponse {
        /// Name of the engine.
        engine: String,
        /// The raw response.
        details: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },
}

impl ScanError {
    /// Returns the engine name if this error is associated with one.
    pub fn engine(&self) -> Option<&str> {
        match self {
            Self::EngineUnavailable { engine, .. }
            | Self::ConnectionFailed { engine, .. }
            | Self::AmbiguousResponse { engine, .. } => Some(engine),
            _ => None,
        }
    }

    /// Creates an `EngineUnavailable` error.
    pub fn engine_unavailable(engine: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            engine: engine.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `ConnectionFailed` error.
    pub fn connection_failed(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Error type for invalid validation policies.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A field holds an unusable value.
    #[error("invalid policy field '{field}': {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// Why it is invalid.
        reason: String,
    },

    /// A built-in pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The pattern text.
        pattern: String,
        /// Compiler error.
        #[source]
        source: regex::Error,
    },

    /// The policy document could not be parsed.
    #[error("failed to parse policy: {0}")]
    Parse(#[from] serde_json::Error),
}

impl PolicyError {
    /// Creates an `InvalidField` error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// A specialized `Result` type for pipeline stages.
pub type StageResult<T = ()> = Result<T, ValidationError>;

/// A specialized `Result` type for scanner operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// A specialized `Result` type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_error_display_carries_values() {
        let err = ValidationError::from(SizeError::TooLarge {
            size: 157_286_400,
            max: 104_857_600,
        });
        let message = err.to_string();
        assert!(message.contains("157286400"));
        assert!(message.contains("104857600"));
        assert_eq!(err.kind(), ErrorKind::SizeError);
    }

    #[test]
    fn test_nested_errors_map_to_kind() {
        let err: ValidationError = FilenameError::PathTraversal.into();
        assert_eq!(err.kind(), ErrorKind::FilenameError);

        let err: ValidationError = EmbeddedThreatError::MacrosNotAllowed.into();
        assert_eq!(err.kind(), ErrorKind::EmbeddedThreatError);
        assert_eq!(err.to_string(), "Documents with macros are not allowed");
    }

    #[test]
    fn test_dangerous_signature_display() {
        let err: ValidationError = SignatureError::Dangerous {
            description: "Executable file (PE)".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Dangerous file type detected: Executable file (PE)"
        );
    }

    #[test]
    fn test_io_error_becomes_structural() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ValidationError::from(io_err);
        assert_eq!(err.kind(), ErrorKind::StructuralError);
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_scan_error_engine() {
        let err = ScanError::engine_unavailable("clamav", "service not running");
        assert_eq!(err.engine(), Some("clamav"));

        let io_err = ScanError::Io(std::io::Error::new(std::io::ErrorKind::Other, "test"));
        assert_eq!(io_err.engine(), None);
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ContainerStructureError).unwrap();
        assert_eq!(json, "\"container_structure_error\"");
    }
}
