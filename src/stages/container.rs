//! DOCX package structure.
//!
//! A DOCX upload legitimately starts with the ZIP local-file header, which
//! is otherwise blocklisted. The signature scanner only lets it through if
//! the archive is shaped like a word-processing package.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const PACKAGE_RELS_PART: &str = "_rels/.rels";

/// Why a file is not a well-formed DOCX package.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerDefect {
    /// The file could not be opened as a ZIP archive.
    #[error("not a readable ZIP archive ({0})")]
    Unreadable(String),
    /// A required part is absent.
    #[error("missing required part {0}")]
    MissingPart(&'static str),
}

/// Checks that the archive at `path` contains `[Content_Types].xml`,
/// `_rels/.rels` and a `word/` entry naming `document.xml`.
pub fn inspect_docx_structure(path: &Path) -> Result<(), ContainerDefect> {
    let file = File::open(path).map_err(|e| ContainerDefect::Unreadable(e.to_string()))?;
    let archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| ContainerDefect::Unreadable(e.to_string()))?;

    let mut has_content_types = false;
    let mut has_rels = false;
    let mut has_document = false;
    for name in archive.file_names() {
        match name {
            CONTENT_TYPES_PART => has_content_types = true,
            PACKAGE_RELS_PART => has_rels = true,
            _ if name.starts_with("word/") && name.contains("document.xml") => {
                has_document = true
            }
            _ => {}
        }
    }

    if !has_content_types {
        return Err(ContainerDefect::MissingPart(CONTENT_TYPES_PART));
    }
    if !has_rels {
        return Err(ContainerDefect::MissingPart(PACKAGE_RELS_PART));
    }
    if !has_document {
        return Err(ContainerDefect::MissingPart("word/document.xml"));
    }
    Ok(())
}
