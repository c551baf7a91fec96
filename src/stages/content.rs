//! Bounded-prefix content scan.
//!
//! Only the first `content_scan_limit` bytes are inspected, so a payload
//! placed after the prefix is not seen here. Deep inspection of PDF and DOCX
//! happens in [`crate::stages::embedded`].

use regex::Regex;

use crate::core::error::{ContentError, EmbeddedThreatError, PolicyError, StageResult};
use crate::core::types::DocumentFormat;
use crate::policy::table::{
    EMBEDDED_EXECUTABLE_MARKERS, MALICIOUS_TEXT_PATTERNS, SUSPICIOUS_URL_PATTERNS,
};
use crate::policy::ValidationPolicy;
use crate::stages::contains_bytes;

/// Scans the leading bytes of an upload.
///
/// Holds the compiled URL patterns, so build it once and share it.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    url_patterns: Vec<Regex>,
}

impl ContentScanner {
    /// Compiles the executable-URL patterns.
    pub fn new() -> Result<Self, PolicyError> {
        let url_patterns = SUSPICIOUS_URL_PATTERNS
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| PolicyError::InvalidPattern {
                    pattern: (*pattern).to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { url_patterns })
    }

    /// Runs the format's checks over `prefix`, then the executable-marker
    /// checks every format gets.
    ///
    /// `truncated` says whether `prefix` stops short of the end of the file.
    /// A multi-byte UTF-8 sequence cut by that boundary is not an encoding
    /// error.
    pub fn scan(
        &self,
        prefix: &[u8],
        format: Option<DocumentFormat>,
        truncated: bool,
        policy: &ValidationPolicy,
        warnings: &mut Vec<String>,
    ) -> StageResult {
        match format {
            Some(format) if format.is_text() => {
                self.scan_text(prefix, truncated, policy, warnings)?
            }
            Some(DocumentFormat::Pdf) => scan_pdf(prefix, warnings),
            Some(DocumentFormat::Docx) => scan_docx(prefix, warnings)?,
            Some(DocumentFormat::Rtf) => scan_rtf(prefix, warnings),
            _ => {}
        }

        if let Some(description) = find_embedded_executable(prefix) {
            return Err(ContentError::EmbeddedExecutable {
                description: description.to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn scan_text(
        &self,
        prefix: &[u8],
        truncated: bool,
        policy: &ValidationPolicy,
        warnings: &mut Vec<String>,
    ) -> StageResult {
        if prefix.contains(&0) {
            return Err(ContentError::BinaryInText.into());
        }

        let text = decode_utf8(prefix, truncated)?;
        let lowered = text.to_lowercase();

        if let Some((_, description)) = MALICIOUS_TEXT_PATTERNS
            .iter()
            .find(|(pattern, _)| lowered.contains(pattern))
        {
            return Err(ContentError::MaliciousPattern {
                description: (*description).to_string(),
            }
            .into());
        }

        if self.url_patterns.iter().any(|re| re.is_match(text)) {
            return Err(ContentError::SuspiciousUrl.into());
        }

        let ratio = special_char_ratio(text);
        if ratio > policy.obfuscation_threshold {
            warnings.push(format!(
                "High ratio of special characters ({:.1}%) - possible obfuscation",
                ratio * 100.0
            ));
        }
        Ok(())
    }
}

/// Decodes strict UTF-8, tolerating only a sequence cut at the end of a
/// truncated prefix.
fn decode_utf8(prefix: &[u8], truncated: bool) -> StageResult<&str> {
    match std::str::from_utf8(prefix) {
        Ok(text) => Ok(text),
        Err(e) if truncated && e.error_len().is_none() => {
            // valid_up_to() marks a char boundary
            Ok(std::str::from_utf8(&prefix[..e.valid_up_to()]).unwrap_or_default())
        }
        Err(e) => Err(ContentError::InvalidEncoding {
            detail: e.to_string(),
        }
        .into()),
    }
}

/// Fraction of characters that are neither alphanumeric nor whitespace.
fn special_char_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut special = 0usize;
    for c in text.chars() {
        total += 1;
        if !c.is_alphanumeric() && !c.is_whitespace() {
            special += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        special as f64 / total as f64
    }
}

fn scan_pdf(prefix: &[u8], warnings: &mut Vec<String>) {
    if contains_bytes(prefix, b"/JavaScript") || contains_bytes(prefix, b"/JS") {
        warnings.push("PDF contains JavaScript".to_string());
    }
    if contains_bytes(prefix, b"/Action") {
        warnings.push("PDF contains actions".to_string());
    }
    if contains_bytes(prefix, b"/URI") {
        warnings.push("PDF contains external links".to_string());
    }
}

fn scan_docx(prefix: &[u8], warnings: &mut Vec<String>) -> StageResult {
    let lowered = prefix.to_ascii_lowercase();
    if contains_bytes(&lowered, b"vbaproject") || contains_bytes(&lowered, b"macros") {
        return Err(EmbeddedThreatError::MacrosNotAllowed.into());
    }
    if contains_bytes(prefix, b"http://") || contains_bytes(prefix, b"https://") {
        warnings.push("Document contains external links".to_string());
    }
    Ok(())
}

fn scan_rtf(prefix: &[u8], warnings: &mut Vec<String>) {
    if contains_bytes(prefix, b"\\object") {
        warnings.push("RTF contains embedded objects".to_string());
    }
    if contains_bytes(prefix, b"\\field") {
        warnings.push("RTF contains fields".to_string());
    }
}

/// Returns a description of the first executable marker found in `data`.
fn find_embedded_executable(data: &[u8]) -> Option<&'static str> {
    EMBEDDED_EXECUTABLE_MARKERS
        .iter()
        .find(|(marker, _)| contains_bytes(data, marker))
        .map(|(_, description)| *description)
}
