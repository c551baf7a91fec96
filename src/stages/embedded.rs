//! Whole-file inspection of PDF features and DOCX package entries.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use memchr::memmem;

use crate::core::error::{EmbeddedThreatError, StageResult};
use crate::policy::table::{DANGEROUS_PDF_FEATURES, SUSPICIOUS_PDF_FEATURES};
use crate::stages::contains_bytes;

const PDF_CHUNK_SIZE: usize = 64 * 1024;

/// Upper bound on how much of `_rels/.rels` is read.
const RELS_READ_LIMIT: u64 = 1024 * 1024;

/// Streams the PDF at `path` looking for feature names.
///
/// `/Launch` and `/ImportData` reject the document; the other listed
/// features add one warning each.
pub fn inspect_pdf_features(path: &Path, warnings: &mut Vec<String>) -> StageResult {
    let finders: Vec<(&str, memmem::Finder<'static>)> = DANGEROUS_PDF_FEATURES
        .iter()
        .chain(SUSPICIOUS_PDF_FEATURES)
        .map(|&(name, _)| (name, memmem::Finder::new(name)))
        .collect();
    let overlap = finders.iter().map(|(name, _)| name.len()).max().unwrap_or(1) - 1;

    let mut found: BTreeSet<&str> = BTreeSet::new();
    let mut reader = BufReader::new(File::open(path)?);
    let mut window: Vec<u8> = Vec::with_capacity(PDF_CHUNK_SIZE + overlap);
    let mut chunk = vec![0u8; PDF_CHUNK_SIZE];
    loop {
        let read = reader.read(&mut chunk)?;
        if read == 0 {
            break;
        }
        window.extend_from_slice(&chunk[..read]);
        for (name, finder) in &finders {
            if !found.contains(name) && finder.find(&window).is_some() {
                found.insert(*name);
            }
        }
        let keep = window.len().min(overlap);
        window.drain(..window.len() - keep);
    }

    if let Some((feature, description)) = DANGEROUS_PDF_FEATURES
        .iter()
        .find(|(name, _)| found.contains(name))
    {
        return Err(EmbeddedThreatError::DangerousPdfFeature {
            feature: (*feature).to_string(),
            description: (*description).to_string(),
        }
        .into());
    }

    for (name, warning) in SUSPICIOUS_PDF_FEATURES {
        if found.contains(name) {
            warnings.push((*warning).to_string());
        }
    }
    Ok(())
}

/// Walks the DOCX entry list.
///
/// A `vbaProject.bin` entry rejects the document. ActiveX controls,
/// embedded objects and media add warnings, as do `http(s)` targets in the
/// package relationships.
pub fn inspect_docx_entries(path: &Path, warnings: &mut Vec<String>) -> StageResult {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))?;

    let mut has_activex = false;
    let mut has_embeddings = false;
    let mut has_media = false;
    for name in archive.file_names() {
        if name.contains("vbaProject.bin") {
            return Err(EmbeddedThreatError::MacrosNotAllowed.into());
        }
        has_activex |= name.contains("activeX");
        has_embeddings |= name.contains("embeddings/");
        has_media |= name.contains("media/");
    }

    if has_activex {
        warnings.push("Document contains ActiveX controls".to_string());
    }
    if has_embeddings {
        warnings.push("Document contains embedded objects".to_string());
    }
    if has_media {
        warnings.push("Document contains media files".to_string());
    }

    let rels = match archive.by_name("_rels/.rels") {
        Ok(entry) => {
            let mut buf = Vec::new();
            entry.take(RELS_READ_LIMIT).read_to_end(&mut buf)?;
            Some(buf)
        }
        Err(zip::result::ZipError::FileNotFound) => None,
        Err(e) => return Err(e.into()),
    };
    if let Some(rels) = rels {
        if contains_bytes(&rels, b"http://") || contains_bytes(&rels, b"https://") {
            warnings.push("Document contains external references".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidationError;
    use crate::test_support::{docx_bytes, write_temp, zip_bytes};

    fn pdf(bytes: &[u8]) -> (StageResult, Vec<String>) {
        let tmp = write_temp(bytes);
        let mut warnings = Vec::new();
        let result = inspect_pdf_features(tmp.path(), &mut warnings);
        (result, warnings)
    }

    fn docx(extra: &[(&str, &[u8])]) -> (StageResult, Vec<String>) {
        let tmp = write_temp(&docx_bytes(extra));
        let mut warnings = Vec::new();
        let result = inspect_docx_entries(tmp.path(), &mut warnings);
        (result, warnings)
    }

    #[test]
    fn test_launch_is_fatal() {
        let (result, _) = pdf(b"%PDF-1.4\n1 0 obj << /Type /Action /S /Launch /F (cmd.exe) >>");
        assert_eq!(
            result.unwrap_err(),
            ValidationError::EmbeddedThreat(EmbeddedThreatError::DangerousPdfFeature {
                feature: "/Launch".into(),
                description: "launch external application".into()
            })
        );
    }

    #[test]
    fn test_suspicious_features_warn_once() {
        let (result, warnings) = pdf(b"%PDF-1.7 /EmbeddedFile /EmbeddedFile /XFA /SubmitForm");
        assert!(result.is_ok());
        assert_eq!(
            warnings,
            vec![
                "PDF contains embedded files".to_string(),
                "PDF contains XFA forms".to_string(),
                "PDF contains form submission".to_string(),
            ]
        );
    }

    #[test]
    fn test_feature_split_across_chunks() {
        let mut data = b"%PDF-1.4\n".to_vec();
        data.resize(PDF_CHUNK_SIZE - 4, b' ');
        data.extend_from_slice(b"/ImportData");
        data.extend_from_slice(&[b' '; 100]);
        let (result, _) = pdf(&data);
        assert!(matches!(
            result.unwrap_err(),
            ValidationError::EmbeddedThreat(EmbeddedThreatError::DangerousPdfFeature { .. })
        ));
    }

    #[test]
    fn test_feature_past_content_prefix() {
        let mut data = b"%PDF-1.4\n".to_vec();
        data.resize(3 * 1024 * 1024, b' ');
        data.extend_from_slice(b"/Launch");
        let (result, _) = pdf(&data);
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_pdf() {
        let (result, warnings) = pdf(b"%PDF-1.4\n1 0 obj << /Type /Page >>\n%%EOF");
        assert!(result.is_ok());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_docx_vba_project() {
        let (result, _) = docx(&[("word/vbaProject.bin", b"\x00\x01".as_slice())]);
        assert_eq!(result.unwrap_err(), EmbeddedThreatError::MacrosNotAllowed.into());
    }

    #[test]
    fn test_docx_activex_and_media_warn() {
        let (result, warnings) = docx(&[
            ("word/activeX/activeX1.xml", b"<ax/>".as_slice()),
            ("word/media/image1.png", b"png".as_slice()),
        ]);
        assert!(result.is_ok());
        assert!(warnings.contains(&"Document contains ActiveX controls".to_string()));
        assert!(warnings.contains(&"Document contains media files".to_string()));
        assert!(!warnings.contains(&"Document contains embedded objects".to_string()));
    }

    #[test]
    fn test_docx_external_rels() {
        let (result, warnings) = docx(&[]);
        assert!(result.is_ok());
        assert!(warnings.contains(&"Document contains external references".to_string()));
    }

    #[test]
    fn test_docx_without_rels_part() {
        let bytes = zip_bytes(&[("word/document.xml", b"<document/>".as_slice())]);
        let tmp = write_temp(&bytes);
        let mut warnings = Vec::new();
        assert!(inspect_docx_entries(tmp.path(), &mut warnings).is_ok());
        assert!(warnings.is_empty());
    }
}
