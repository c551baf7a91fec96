//! Fixture builders shared by the unit tests.

use std::io::{Cursor, Write};

use tempfile::NamedTempFile;
use zip::write::FileOptions;

use crate::core::UploadedFile;

pub(crate) const CONTENT_TYPES_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

pub(crate) const PACKAGE_RELS_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub(crate) const DOCUMENT_XML: &[u8] = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Quarterly report</w:t></w:r></w:p></w:body></w:document>"#;

/// Writes `bytes` to a fresh temporary file.
pub(crate) fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp.flush().unwrap();
    tmp
}

/// Writes `bytes` to a temporary file and describes it as an upload named
/// `declared_filename`. Keep the returned guard alive for the test.
pub(crate) fn temp_upload(bytes: &[u8], declared_filename: &str) -> (NamedTempFile, UploadedFile) {
    let tmp = write_temp(bytes);
    let file = UploadedFile::from_path(tmp.path(), declared_filename).unwrap();
    (tmp, file)
}

/// Builds an uncompressed ZIP archive from `(name, data)` entries.
pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::<u8>::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Builds a minimal well-formed DOCX, plus `extra` entries.
pub(crate) fn docx_bytes(extra: &[(&str, &[u8])]) -> Vec<u8> {
    let mut entries: Vec<(&str, &[u8])> = vec![
        ("[Content_Types].xml", CONTENT_TYPES_XML),
        ("_rels/.rels", PACKAGE_RELS_XML),
        ("word/document.xml", DOCUMENT_XML),
    ];
    entries.extend_from_slice(extra);
    zip_bytes(&entries)
}

/// A small valid PDF with `body` placed inside the first object.
pub(crate) fn pdf_bytes(body: &str) -> Vec<u8> {
    format!(
        "%PDF-1.4\n1 0 obj\n<< /Type /Catalog {} >>\nendobj\ntrailer\n<< /Root 1 0 R >>\n%%EOF\n",
        body
    )
    .into_bytes()
}
