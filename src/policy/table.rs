//! Built-in policy constants.
//!
//! These are the values a default [`ValidationPolicy`](super::ValidationPolicy)
//! is built from. Order is significant in every list below: signature
//! matching and pattern scanning report the first hit.

/// Default upper size bound: 100 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Default lower size bound.
pub const DEFAULT_MIN_FILE_SIZE: u64 = 10;

/// Longest accepted filename, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Bytes of header inspected by the signature scanner.
pub const SIGNATURE_HEADER_LEN: usize = 32;

/// Bytes of content inspected by the content scanner.
pub const CONTENT_SCAN_LIMIT: usize = 2 * 1024 * 1024;

/// Ratio of special characters above which text is flagged as obfuscated.
pub const OBFUSCATION_THRESHOLD: f64 = 0.3;

/// The ZIP local-file header.
pub const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";

/// MIME type of DOCX documents.
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Extensions accepted by default.
pub const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc", ".txt", ".md", ".rtf"];

/// Extension to acceptable MIME types.
pub const EXTENSION_MIME_MAP: &[(&str, &[&str])] = &[
    (".pdf", &["application/pdf"]),
    (".docx", &[DOCX_MIME]),
    (".doc", &["application/msword"]),
    (".txt", &["text/plain"]),
    (".md", &["text/markdown", "text/plain", "text/x-markdown"]),
    (".rtf", &["application/rtf", "text/rtf"]),
];

/// MIME types treated as interchangeable for plain-text extensions.
pub const TEXT_MIME_TYPES: &[&str] = &["text/plain", "text/markdown", "text/x-markdown"];

/// Magic-byte prefixes that are never acceptable as a document.
pub const DANGEROUS_SIGNATURES: &[(&[u8], &str)] = &[
    (b"MZ", "Executable file (PE)"),
    (b"\x7fELF", "Executable file (ELF)"),
    (b"\xfe\xed\xfa\xce", "Mach-O executable (32-bit)"),
    (b"\xfe\xed\xfa\xcf", "Mach-O executable (64-bit)"),
    (b"\xce\xfa\xed\xfe", "Mach-O executable (32-bit, reversed)"),
    (b"\xcf\xfa\xed\xfe", "Mach-O executable (64-bit, reversed)"),
    (b"\xca\xfe\xba\xbe", "Java class file"),
    (b"#!/bin/sh", "Shell script"),
    (b"#!/bin/bash", "Bash script"),
    (b"#!/usr/bin/env", "Script with shebang"),
    (b"#!/usr/bin/python", "Python script"),
    (b"#!/usr/bin/perl", "Perl script"),
    (b"<?php", "PHP script"),
    (b"<%@", "JSP script"),
    (b"<%", "ASP script"),
    (b"\x89PNG\r\n\x1a\n", "PNG image (disguised)"),
    (b"\xff\xd8\xff", "JPEG image (disguised)"),
    (b"GIF87a", "GIF image (disguised)"),
    (b"GIF89a", "GIF image (disguised)"),
    (b"RIFF", "RIFF container (AVI/WAV)"),
    (b"PK\x03\x04", "ZIP archive"),
    (b"PK\x05\x06", "ZIP archive (empty)"),
    (b"PK\x07\x08", "ZIP archive (spanned)"),
    (b"\x00\x00\x01\x00", "Windows icon"),
    (b"\x00\x00\x02\x00", "Windows cursor"),
];

/// Accepted PDF version markers.
pub const PDF_SIGNATURES: &[&[u8]] = &[
    b"%PDF-1.0",
    b"%PDF-1.1",
    b"%PDF-1.2",
    b"%PDF-1.3",
    b"%PDF-1.4",
    b"%PDF-1.5",
    b"%PDF-1.6",
    b"%PDF-1.7",
    b"%PDF-2.0",
];

/// Filename fragments that indicate path traversal.
pub const DANGEROUS_FILENAME_TOKENS: &[&str] = &["../", "..\\", "./", ".\\"];

/// Characters that are stripped from filenames.
pub const SPECIAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// Windows reserved device names.
pub const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Secondary extensions that make a double extension dangerous.
pub const DANGEROUS_EXTENSIONS: &[&str] = &[
    ".exe", ".bat", ".cmd", ".com", ".scr", ".pif", ".js", ".vbs", ".php",
];

/// Case-insensitive substrings rejected in text files.
pub const MALICIOUS_TEXT_PATTERNS: &[(&str, &str)] = &[
    ("<script", "JavaScript code"),
    ("javascript:", "JavaScript URL"),
    ("vbscript:", "VBScript code"),
    ("data:text/html", "Data URI with HTML"),
    ("<?php", "PHP code"),
    ("<%", "ASP/JSP code"),
    ("eval(", "eval() function call"),
    ("exec(", "exec() function call"),
    ("system(", "system() function call"),
    ("shell_exec(", "shell_exec() function call"),
    ("passthru(", "passthru() function call"),
    ("file_get_contents(", "file_get_contents() function call"),
    ("curl_exec(", "curl_exec() function call"),
    ("base64_decode(", "base64_decode() function call"),
    ("document.write(", "DOM manipulation"),
    ("document.cookie", "Cookie access"),
    ("window.location", "Redirect via window.location"),
    (".innerhtml", "DOM manipulation"),
];

/// URLs pointing at executables.
pub const SUSPICIOUS_URL_PATTERNS: &[&str] = &[
    r"(?i)https?://[^\s]+\.(exe|bat|cmd|scr)",
    r"(?i)ftp://[^\s]+\.(exe|bat|cmd|scr)",
];

/// Byte markers of an executable image embedded in a document. Any of them
/// anywhere in the scanned prefix rejects the upload.
pub const EMBEDDED_EXECUTABLE_MARKERS: &[(&[u8], &str)] = &[
    (
        b"This program cannot be run in DOS mode",
        "DOS stub of a PE executable",
    ),
    (b"PE\0\0", "PE executable header"),
    (b"\x7fELF", "ELF executable header"),
];

/// PDF names that reject the document.
pub const DANGEROUS_PDF_FEATURES: &[(&str, &str)] = &[
    ("/Launch", "launch external application"),
    ("/ImportData", "import external data"),
];

/// PDF names that only warn.
pub const SUSPICIOUS_PDF_FEATURES: &[(&str, &str)] = &[
    ("/EmbeddedFile", "PDF contains embedded files"),
    ("/XFA", "PDF contains XFA forms"),
    ("/RichMedia", "PDF contains rich media"),
    ("/3D", "PDF contains 3D content"),
    ("/Sound", "PDF contains sound"),
    ("/Movie", "PDF contains movies"),
    ("/GoToR", "PDF contains remote go-to actions"),
    ("/SubmitForm", "PDF contains form submission"),
];
