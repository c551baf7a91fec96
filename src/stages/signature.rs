//! Magic-byte checks on the file header.

use crate::core::error::{ContentError, SignatureError, StageResult, ValidationError};
use crate::core::types::DocumentFormat;
use crate::core::UploadedFile;
use crate::policy::table::ZIP_LOCAL_HEADER;
use crate::policy::ValidationPolicy;
use crate::stages::container::inspect_docx_structure;

/// Matches the header against the ordered blocklist, then applies the
/// declared format's own header rule.
///
/// A ZIP local-file header is allowed only for container formats, and only
/// if the archive passes [`inspect_docx_structure`].
pub fn check_signature(
    file: &UploadedFile,
    extension: &str,
    policy: &ValidationPolicy,
) -> StageResult {
    let header = file.read_prefix(policy.signature_header_len)?;
    let format = DocumentFormat::from_extension(extension);

    if let Some(signature) = policy
        .dangerous_signatures
        .iter()
        .find(|signature| signature.matches(&header))
    {
        if signature.bytes != ZIP_LOCAL_HEADER {
            return Err(SignatureError::Dangerous {
                description: signature.description.clone(),
            }
            .into());
        }
        if !format.map(|f| f.is_container()).unwrap_or(false) {
            return Err(SignatureError::ZipNotAllowed {
                extension: extension.to_string(),
            }
            .into());
        }
        tracing::debug!(path = %file.path().display(), "ZIP header on container format; checking structure");
        inspect_docx_structure(file.path())
            .map_err(|defect| ValidationError::container(defect.to_string()))?;
    }

    match format {
        Some(DocumentFormat::Pdf) => {
            if !policy
                .pdf_signatures
                .iter()
                .any(|marker| header.starts_with(marker))
            {
                return Err(invalid_signature(DocumentFormat::Pdf));
            }
        }
        Some(DocumentFormat::Docx) => {
            if !header.starts_with(ZIP_LOCAL_HEADER) {
                return Err(invalid_signature(DocumentFormat::Docx));
            }
        }
        Some(format) if format.is_text() => {
            if header.contains(&0) {
                return Err(ContentError::BinaryInText.into());
            }
        }
        _ => {}
    }

    Ok(())
}

fn invalid_signature(format: DocumentFormat) -> ValidationError {
    SignatureError::InvalidFormatSignature {
        format: format.to_string(),
    }
    .into()
}
