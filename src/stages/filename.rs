//! Declared-filename checks.

use crate::core::error::{FilenameError, StageResult};
use crate::policy::table::SPECIAL_FILENAME_CHARS;
use crate::policy::ValidationPolicy;

/// Checks the declared filename, in this order: traversal tokens, NUL,
/// special characters (warning only), reserved device stems, length, and
/// dangerous secondary extensions.
pub fn check_filename(
    filename: &str,
    policy: &ValidationPolicy,
    warnings: &mut Vec<String>,
) -> StageResult {
    if policy
        .dangerous_filename_tokens
        .iter()
        .any(|token| filename.contains(token.as_str()))
    {
        return Err(FilenameError::PathTraversal.into());
    }

    if filename.contains('\0') {
        return Err(FilenameError::NullByte.into());
    }

    if filename.contains(SPECIAL_FILENAME_CHARS) {
        warnings.push("Filename contains special characters that will be sanitized".to_string());
    }

    let stem = stem_of(filename);
    if is_reserved_stem(stem, &policy.reserved_names) {
        return Err(FilenameError::ReservedName {
            stem: stem.to_string(),
        }
        .into());
    }

    let length = filename.chars().count();
    if length > policy.max_filename_length {
        return Err(FilenameError::NameTooLong {
            length,
            max: policy.max_filename_length,
        }
        .into());
    }

    let parts: Vec<&str> = filename.split('.').collect();
    if parts.len() > 2 {
        for part in &parts[1..parts.len() - 1] {
            let extension = format!(".{}", part.to_ascii_lowercase());
            if policy.dangerous_extensions.iter().any(|e| *e == extension) {
                return Err(FilenameError::SuspiciousDoubleExtension { extension }.into());
            }
        }
    }

    Ok(())
}

/// Returns `filename` without its last extension. A leading dot does not
/// start an extension.
pub(crate) fn stem_of(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

/// Returns `true` if `stem` is a reserved device name, ignoring case.
pub(crate) fn is_reserved_stem(stem: &str, reserved: &[String]) -> bool {
    reserved.iter().any(|name| name.eq_ignore_ascii_case(stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidationError;

    fn check(name: &str) -> (StageResult, Vec<String>) {
        let mut warnings = Vec::new();
        let result = check_filename(name, &ValidationPolicy::default(), &mut warnings);
        (result, warnings)
    }

    fn filename_error(name: &str) -> FilenameError {
        match check(name).0 {
            Err(ValidationError::Filename(err)) => err,
            other => panic!("expected filename error for {:?}, got {:?}", name, other),
        }
    }

    #[test]
    fn test_plain_names_pass() {
        for name in ["report.pdf", "my document (1).docx", "notes.v2.txt", "README.md"] {
            let (result, warnings) = check(name);
            assert!(result.is_ok(), "{name}");
            assert!(warnings.is_empty(), "{name}");
        }
    }

    #[test]
    fn test_path_traversal() {
        for name in ["../../etc/passwd.txt", "..\\boot.ini.txt", "./a.pdf", ".\\a.pdf"] {
            assert_eq!(filename_error(name), FilenameError::PathTraversal);
        }
    }

    #[test]
    fn test_traversal_wins_over_later_checks() {
        assert_eq!(filename_error("../CON\0.exe.pdf"), FilenameError::PathTraversal);
    }

    #[test]
    fn test_null_byte() {
        assert_eq!(filename_error("report\0.pdf"), FilenameError::NullByte);
    }

    #[test]
    fn test_special_characters_warn() {
        let (result, warnings) = check("what?<draft>.pdf");
        assert!(result.is_ok());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("special characters"));
    }

    #[test]
    fn test_reserved_names() {
        for name in ["CON.pdf", "con.txt", "Lpt9.docx", "NUL", "com1.md"] {
            assert!(matches!(filename_error(name), FilenameError::ReservedName { .. }), "{name}");
        }
        assert!(check("CONSOLE.pdf").0.is_ok());
        assert!(check("COM10.pdf").0.is_ok());
    }

    #[test]
    fn test_name_too_long() {
        let name = format!("{}.pdf", "a".repeat(251));
        assert!(check(&name).0.is_ok());

        let name = format!("{}.pdf", "a".repeat(252));
        assert_eq!(
            filename_error(&name),
            FilenameError::NameTooLong { length: 256, max: 255 }
        );
    }

    #[test]
    fn test_dangerous_double_extension() {
        assert_eq!(
            filename_error("invoice.exe.pdf"),
            FilenameError::SuspiciousDoubleExtension {
                extension: ".exe".into()
            }
        );
        assert!(matches!(
            filename_error("payload.JS.txt"),
            FilenameError::SuspiciousDoubleExtension { .. }
        ));
        assert!(check("archive.tar.pdf").0.is_ok());
    }

    #[test]
    fn test_stem_of() {
        assert_eq!(stem_of("CON.pdf"), "CON");
        assert_eq!(stem_of("a.b.c"), "a.b");
        assert_eq!(stem_of(".hidden"), ".hidden");
        assert_eq!(stem_of("plain"), "plain");
    }
}
