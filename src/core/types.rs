//! Core types used throughout the docgate library.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The document formats the validator knows format-specific checks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document (a ZIP container).
    Docx,
    /// Legacy Word binary document (OLE2 compound file).
    Doc,
    /// Plain text.
    Txt,
    /// Markdown.
    Md,
    /// Rich Text Format.
    Rtf,
}

impl DocumentFormat {
    /// Maps a lower-cased extension (with dot) to its format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".pdf" => Some(Self::Pdf),
            ".docx" => Some(Self::Docx),
            ".doc" => Some(Self::Doc),
            ".txt" => Some(Self::Txt),
            ".md" => Some(Self::Md),
            ".rtf" => Some(Self::Rtf),
            _ => None,
        }
    }

    /// Returns the canonical extension, with dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::Doc => ".doc",
            Self::Txt => ".txt",
            Self::Md => ".md",
            Self::Rtf => ".rtf",
        }
    }

    /// Returns `true` for formats that must be plain UTF-8 text.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Txt | Self::Md)
    }

    /// Returns `true` for ZIP-based container formats.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Docx)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "PDF"),
            Self::Docx => write!(f, "DOCX"),
            Self::Doc => write!(f, "DOC"),
            Self::Txt => write!(f, "TXT"),
            Self::Md => write!(f, "MD"),
            Self::Rtf => write!(f, "RTF"),
        }
    }
}

/// Verdict of a malware-scan capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// No threats were detected.
    Clean,

    /// The file is infected.
    Infected {
        /// Detected threats.
        threats: Vec<ThreatInfo>,
    },
}

impl ScanOutcome {
    /// Returns `true` if the outcome indicates a clean file.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean)
    }

    /// Returns `true` if the outcome indicates an infected file.
    pub fn is_infected(&self) -> bool {
        matches!(self, Self::Infected { .. })
    }

    /// Creates an `Infected` outcome with a single named threat.
    pub fn infected(name: impl Into<String>, engine: impl Into<String>) -> Self {
        Self::Infected {
            threats: vec![ThreatInfo::new(name, engine)],
        }
    }
}

/// A single threat reported by a scanning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatInfo {
    /// Engine-specific threat name (e.g. "Eicar-Test-Signature").
    pub name: String,

    /// Name of the engine that detected it.
    pub engine: String,
}

impl ThreatInfo {
    /// Creates a new `ThreatInfo`.
    pub fn new(name: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: engine.into(),
        }
    }
}

impl fmt::Display for ThreatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_format_round_trip() {
        for ext in [".pdf", ".docx", ".doc", ".txt", ".md", ".rtf"] {
            let format = DocumentFormat::from_extension(ext).unwrap();
            assert_eq!(format.extension(), ext);
        }
        assert_eq!(DocumentFormat::from_extension(".exe"), None);
    }

    #[test]
    fn test_document_format_classes() {
        assert!(DocumentFormat::Txt.is_text());
        assert!(DocumentFormat::Md.is_text());
        assert!(!DocumentFormat::Rtf.is_text());
        assert!(DocumentFormat::Docx.is_container());
        assert!(!DocumentFormat::Doc.is_container());
    }

    #[test]
    fn test_scan_outcome_is_methods() {
        assert!(ScanOutcome::Clean.is_clean());
        let infected = ScanOutcome::infected("Eicar-Test-Signature", "clamav");
        assert!(infected.is_infected());
        assert!(!infected.is_clean());
    }

    #[test]
    fn test_threat_display() {
        let threat = ThreatInfo::new("Eicar-Test-Signature", "clamav");
        assert_eq!(threat.to_string(), "Eicar-Test-Signature (clamav)");
    }
}
