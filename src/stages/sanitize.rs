//! Storage-safe filenames.

use crate::policy::table::{DANGEROUS_FILENAME_TOKENS, MAX_FILENAME_LENGTH, RESERVED_NAMES};
use crate::policy::ValidationPolicy;
use crate::stages::filename::stem_of;

const REPLACED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0'];
const RESERVED_PREFIX: &str = "file_";
const FALLBACK_NAME: &str = "unnamed";

/// Normalizes an uploaded filename for storage using the built-in tables.
///
/// Special characters and NUL become `_`, traversal tokens are removed,
/// remaining separators become `_`, device names get a `file_` prefix and
/// the result is cut to 255 bytes keeping the extension. Applying it twice
/// gives the same result as applying it once.
///
/// [`sanitize_filename_with`] does the same with a deployment's policy.
///
/// # Examples
///
/// ```rust
/// use docgate::stages::sanitize_filename;
///
/// assert_eq!(sanitize_filename("../../etc/passwd.txt"), "etc_passwd.txt");
/// assert_eq!(sanitize_filename("CON.pdf"), "file_CON.pdf");
/// ```
pub fn sanitize_filename(filename: &str) -> String {
    sanitize(
        filename,
        DANGEROUS_FILENAME_TOKENS,
        RESERVED_NAMES,
        MAX_FILENAME_LENGTH,
    )
}

/// Normalizes `filename` with the policy's traversal tokens, reserved names
/// and length limit. This is what the validator applies to accepted uploads.
pub fn sanitize_filename_with(filename: &str, policy: &ValidationPolicy) -> String {
    sanitize(
        filename,
        &policy.dangerous_filename_tokens,
        &policy.reserved_names,
        policy.max_filename_length,
    )
}

fn sanitize<T: AsRef<str>, R: AsRef<str>>(
    filename: &str,
    tokens: &[T],
    reserved_names: &[R],
    max_len: usize,
) -> String {
    let mut name: String = filename
        .chars()
        .map(|c| if REPLACED_CHARS.contains(&c) { '_' } else { c })
        .collect();

    // removing one token can splice together another
    while let Some(token) = tokens
        .iter()
        .map(AsRef::as_ref)
        .find(|token| !token.is_empty() && name.contains(*token))
    {
        name = name.replace(token, "");
    }

    let mut name = name.replace(['/', '\\'], "_");
    if name.chars().all(|c| c == '.') {
        name = FALLBACK_NAME.to_string();
    }

    for _ in 0..2 {
        if is_reserved(stem_of(&name), reserved_names) {
            name = format!("{}{}", RESERVED_PREFIX, name);
        }
        name = truncate_preserving_extension(&name, max_len);
    }
    name
}

fn is_reserved<R: AsRef<str>>(stem: &str, reserved_names: &[R]) -> bool {
    reserved_names
        .iter()
        .any(|n| n.as_ref().eq_ignore_ascii_case(stem))
}

/// Cuts `name` to at most `max` bytes on a char boundary, keeping the
/// extension when it is shorter than `max`.
fn truncate_preserving_extension(name: &str, max: usize) -> String {
    if name.len() <= max {
        return name.to_string();
    }
    let stem = stem_of(name);
    let extension = &name[stem.len()..];
    if extension.is_empty() || extension.len() >= max {
        return floor_to_boundary(name, max).to_string();
    }
    let stem = floor_to_boundary(stem, max - extension.len());
    format!("{}{}", stem, extension)
}

fn floor_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_idempotent(input: &str) {
        let once = sanitize_filename(input);
        assert_eq!(sanitize_filename(&once), once, "input {:?}", input);
    }

    fn assert_storage_safe(input: &str) {
        let sanitized = sanitize_filename(input);
        assert!(!sanitized.contains("../"), "input {:?}", input);
        assert!(!sanitized.contains("..\\"), "input {:?}", input);
        assert!(!sanitized.contains(REPLACED_CHARS), "input {:?}", input);
        assert!(sanitized.len() <= MAX_FILENAME_LENGTH, "input {:?}", input);
    }

    #[test]
    fn test_clean_name_unchanged() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("my notes (v2).md"), "my notes (v2).md");
    }

    #[test]
    fn test_special_characters_replaced() {
        assert_eq!(sanitize_filename("what?<draft>.pdf"), "what__draft_.pdf");
        assert_eq!(sanitize_filename("a\0b.txt"), "a_b.txt");
    }

    #[test]
    fn test_traversal_stripped() {
        assert_eq!(sanitize_filename("../../etc/passwd.txt"), "etc_passwd.txt");
        assert_eq!(sanitize_filename("..\\..\\boot.ini.txt"), "boot.ini.txt");
        assert_eq!(sanitize_filename("...//x.pdf"), "x.pdf");
        assert_eq!(sanitize_filename("dir/sub\\f.txt"), "dir_sub_f.txt");
    }

    #[test]
    fn test_reserved_names_prefixed() {
        assert_eq!(sanitize_filename("CON.pdf"), "file_CON.pdf");
        assert_eq!(sanitize_filename("lpt1"), "file_lpt1");
        assert_eq!(sanitize_filename("CONSOLE.pdf"), "CONSOLE.pdf");
    }

    #[test]
    fn test_empty_results_get_fallback() {
        assert_eq!(sanitize_filename(""), "unnamed");
        assert_eq!(sanitize_filename("../"), "unnamed");
        assert_eq!(sanitize_filename(".."), "unnamed");
    }

    #[test]
    fn test_truncation_keeps_extension() {
        let long = format!("{}.docx", "a".repeat(300));
        let sanitized = sanitize_filename(&long);
        assert_eq!(sanitized.len(), 255);
        assert!(sanitized.ends_with(".docx"));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let long = format!("{}.txt", "\u{e9}".repeat(200));
        let sanitized = sanitize_filename(&long);
        assert!(sanitized.len() <= 255);
        assert!(sanitized.ends_with(".txt"));
        assert!(sanitized.is_char_boundary(sanitized.len() - 4));
    }

    #[test]
    fn test_oversized_extension_truncates_whole_name() {
        let long = format!("a.{}", "b".repeat(300));
        assert_eq!(sanitize_filename(&long).len(), 255);
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "report.pdf",
            "../../etc/passwd.txt",
            "....//....//x",
            "CON.pdf",
            "con",
            "a<b>c:d\"e|f?g*h.txt",
            "",
            ".",
            "...",
            "./CON.txt",
            "dir\\..\\nul.md",
            &format!("{}.pdf", "x".repeat(400)),
            &format!("{}.txt", "\u{e9}".repeat(300)),
            &format!("CON.{}", "e".repeat(260)),
            "..././/.\\..\\a\0b?.txt",
            ".../...//<x>|y*.md",
        ] {
            assert_idempotent(input);
            assert_storage_safe(input);
        }
    }

    #[test]
    fn test_policy_tables_are_used() {
        let mut policy = ValidationPolicy::default();
        policy.reserved_names.push("SECRET".into());
        policy.dangerous_filename_tokens.push("~/".into());
        policy.max_filename_length = 12;

        assert_eq!(sanitize_filename_with("secret.pdf", &policy), "file_sec.pdf");
        assert_eq!(sanitize_filename_with("~/notes.txt", &policy), "notes.txt");
        assert_eq!(sanitize_filename("secret.pdf"), "secret.pdf");
    }
}
