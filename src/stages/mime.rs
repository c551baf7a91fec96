//! Content-sniffed MIME cross-check.

use crate::core::error::{MimeError, StageResult};
use crate::core::traits::MimeSniffer;
use crate::core::types::DocumentFormat;
use crate::core::UploadedFile;
use crate::policy::table::TEXT_MIME_TYPES;
use crate::policy::ValidationPolicy;

/// Warning emitted when no sniffer is available.
pub const MIME_SKIPPED_WARNING: &str = "MIME validation skipped: content type detection unavailable";

/// Sniffs the file and checks the result against the global allowlist and
/// the extension's expected types.
///
/// Returns the detected MIME type, if any. An unavailable sniffer or an
/// undeterminable type produces a warning, never a rejection. Plain-text
/// extensions accept any of the text MIME types, with a warning when the
/// detected one is not the extension's own.
pub fn check_mime(
    file: &UploadedFile,
    extension: &str,
    sniffer: &dyn MimeSniffer,
    policy: &ValidationPolicy,
    warnings: &mut Vec<String>,
) -> StageResult<Option<String>> {
    if !sniffer.is_available() {
        warnings.push(MIME_SKIPPED_WARNING.to_string());
        return Ok(None);
    }

    let detected = match sniffer.sniff(file.path()) {
        Some(raw) => normalize_mime(&raw),
        None => {
            warnings.push("MIME validation skipped: content type could not be determined".to_string());
            return Ok(None);
        }
    };

    tracing::debug!(sniffer = %sniffer.name(), mime = %detected, "MIME type detected");

    if !policy.allowed_mime_types.contains(&detected) {
        return Err(MimeError::Disallowed { detected }.into());
    }

    // an extension with no mapping has no acceptable type
    if policy
        .mime_types_for(extension)
        .is_some_and(|expected| expected.contains(&detected))
    {
        return Ok(Some(detected));
    }

    let is_text_extension = DocumentFormat::from_extension(extension)
        .map(|format| format.is_text())
        .unwrap_or(false);
    if is_text_extension && TEXT_MIME_TYPES.contains(&detected.as_str()) {
        warnings.push(format!(
            "MIME type {} accepted for {} file",
            detected, extension
        ));
        return Ok(Some(detected));
    }

    Err(MimeError::ExtensionMismatch {
        detected,
        extension: extension.to_string(),
    }
    .into())
}

/// Lower-cases a MIME type and drops any parameters.
fn normalize_mime(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or(raw)
        .trim()
        .to_ascii_lowercase()
}
