//! The injectable validation policy.

use crate::core::error::{PolicyError, PolicyResult};
use crate::policy::table;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A magic-byte prefix and what it identifies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// The byte prefix.
    pub bytes: Vec<u8>,
    /// Human-readable description used in rejection messages.
    pub description: String,
}

impl Signature {
    /// Creates a new signature.
    pub fn new(bytes: impl Into<Vec<u8>>, description: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            description: description.into(),
        }
    }

    /// Returns `true` if `header` starts with this signature.
    pub fn matches(&self, header: &[u8]) -> bool {
        !self.bytes.is_empty() && header.starts_with(&self.bytes)
    }
}

/// Every tunable value of the validation pipeline.
///
/// A policy is immutable for the lifetime of a validation call. The default
/// is the built-in table; deployments override fields through the `with_*`
/// setters or by deserializing a partial JSON document.
///
/// # Examples
///
/// ```rust
/// use docgate::policy::ValidationPolicy;
///
/// let policy = ValidationPolicy::default()
///     .with_max_file_size(10 * 1024 * 1024)
///     .with_file_scanning(true);
/// assert!(policy.validate().is_ok());
///
/// let policy = ValidationPolicy::from_json_str(r#"{ "max_file_size_bytes": 1048576 }"#).unwrap();
/// assert_eq!(policy.max_file_size_bytes, 1_048_576);
/// assert_eq!(policy.min_file_size_bytes, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Lower-cased extensions, with dot.
    pub allowed_extensions: BTreeSet<String>,

    /// Every MIME type that may be admitted at all.
    pub allowed_mime_types: BTreeSet<String>,

    /// MIME types acceptable for each extension.
    pub extension_mime_map: BTreeMap<String, BTreeSet<String>>,

    /// Upper size bound in bytes.
    pub max_file_size_bytes: u64,

    /// Lower size bound in bytes.
    pub min_file_size_bytes: u64,

    /// Whether the malware scanner is consulted.
    pub enable_file_scanning: bool,

    /// Ordered blocklist; the first matching entry is reported.
    pub dangerous_signatures: Vec<Signature>,

    /// Accepted PDF header markers.
    pub pdf_signatures: Vec<Vec<u8>>,

    /// Path traversal fragments.
    pub dangerous_filename_tokens: Vec<String>,

    /// Reserved device stems, upper-case.
    pub reserved_names: Vec<String>,

    /// Secondary extensions that reject a double-extension filename.
    pub dangerous_extensions: Vec<String>,

    /// Longest accepted filename.
    pub max_filename_length: usize,

    /// Bytes of header read by the signature scanner.
    pub signature_header_len: usize,

    /// Bytes of content read by the content scanner.
    pub content_scan_limit: usize,

    /// Special-character ratio above which text is flagged.
    pub obfuscation_threshold: f64,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        let extension_mime_map: BTreeMap<String, BTreeSet<String>> = table::EXTENSION_MIME_MAP
            .iter()
            .map(|(ext, mimes)| {
                (
                    ext.to_string(),
                    mimes.iter().map(|m| m.to_string()).collect(),
                )
            })
            .collect();
        let allowed_mime_types = extension_mime_map.values().flatten().cloned().collect();

        Self {
            allowed_extensions: table::ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            allowed_mime_types,
            extension_mime_map,
            max_file_size_bytes: table::DEFAULT_MAX_FILE_SIZE,
            min_file_size_bytes: table::DEFAULT_MIN_FILE_SIZE,
            enable_file_scanning: false,
            dangerous_signatures: table::DANGEROUS_SIGNATURES
                .iter()
                .map(|(bytes, desc)| Signature::new(*bytes, *desc))
                .collect(),
            pdf_signatures: table::PDF_SIGNATURES.iter().map(|s| s.to_vec()).collect(),
            dangerous_filename_tokens: table::DANGEROUS_FILENAME_TOKENS
                .iter()
                .map(|t| t.to_string())
                .collect(),
            reserved_names: table::RESERVED_NAMES.iter().map(|n| n.to_string()).collect(),
            dangerous_extensions: table::DANGEROUS_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            max_filename_length: table::MAX_FILENAME_LENGTH,
            signature_header_len: table::SIGNATURE_HEADER_LEN,
            content_scan_limit: table::CONTENT_SCAN_LIMIT,
            obfuscation_threshold: table::OBFUSCATION_THRESHOLD,
        }
    }
}

impl ValidationPolicy {
    /// Creates the default policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a policy from JSON. Missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> PolicyResult<Self> {
        let policy: Self = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Sets the upper size bound.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size_bytes = bytes;
        self
    }

    /// Sets the lower size bound.
    pub fn with_min_file_size(mut self, bytes: u64) -> Self {
        self.min_file_size_bytes = bytes;
        self
    }

    /// Enables or disables malware scanning.
    pub fn with_file_scanning(mut self, enabled: bool) -> Self {
        self.enable_file_scanning = enabled;
        self
    }

    /// Replaces the extension allowlist. MIME mappings for extensions that
    /// are no longer allowed are dropped.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.into().to_ascii_lowercase())
            .collect();
        let allowed = &self.allowed_extensions;
        self.extension_mime_map.retain(|ext, _| allowed.contains(ext));
        self
    }

    /// Sets the MIME types acceptable for `extension` and admits them
    /// globally.
    pub fn with_extension_mime_types<I, S>(mut self, extension: &str, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mime_types: BTreeSet<String> = mime_types.into_iter().map(Into::into).collect();
        self.allowed_mime_types.extend(mime_types.iter().cloned());
        self.extension_mime_map
            .insert(extension.to_ascii_lowercase(), mime_types);
        self
    }

    /// Appends a signature to the end of the blocklist.
    pub fn with_dangerous_signature(mut self, signature: Signature) -> Self {
        self.dangerous_signatures.push(signature);
        self
    }

    /// Sets the content scan prefix length.
    pub fn with_content_scan_limit(mut self, bytes: usize) -> Self {
        self.content_scan_limit = bytes;
        self
    }

    /// Returns `true` if `extension` is allowlisted.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(extension)
    }

    /// Returns the MIME types acceptable for `extension`.
    pub fn mime_types_for(&self, extension: &str) -> Option<&BTreeSet<String>> {
        self.extension_mime_map.get(extension)
    }

    /// Returns the allowlist as a comma-separated string.
    pub fn allowed_extensions_display(&self) -> String {
        self.allowed_extensions
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Checks the policy for internal consistency.
    pub fn validate(&self) -> PolicyResult<()> {
        if self.min_file_size_bytes > self.max_file_size_bytes {
            return Err(PolicyError::invalid_field(
                "min_file_size_bytes",
                format!(
                    "minimum {} exceeds maximum {}",
                    self.min_file_size_bytes, self.max_file_size_bytes
                ),
            ));
        }
        if self.allowed_extensions.is_empty() {
            return Err(PolicyError::invalid_field(
                "allowed_extensions",
                "at least one extension must be allowed",
            ));
        }
        if let Some(ext) = self.allowed_extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(PolicyError::invalid_field(
                "allowed_extensions",
                format!("extension '{}' must start with a dot", ext),
            ));
        }
        if let Some(ext) = self
            .extension_mime_map
            .keys()
            .find(|ext| !self.allowed_extensions.contains(*ext))
        {
            return Err(PolicyError::invalid_field(
                "extension_mime_map",
                format!("MIME mapping given for '{}', which is not an allowed extension", ext),
            ));
        }
        if let Some(ext) = self
            .allowed_extensions
            .iter()
            .find(|ext| !self.extension_mime_map.contains_key(*ext))
        {
            return Err(PolicyError::invalid_field(
                "extension_mime_map",
                format!("allowed extension '{}' has no MIME mapping", ext),
            ));
        }
        for (ext, mimes) in &self.extension_mime_map {
            if let Some(mime) = mimes.iter().find(|m| !self.allowed_mime_types.contains(*m)) {
                return Err(PolicyError::invalid_field(
                    "extension_mime_map",
                    format!("MIME type '{}' for '{}' is not globally allowed", mime, ext),
                ));
            }
        }
        if self.max_filename_length == 0 {
            return Err(PolicyError::invalid_field(
                "max_filename_length",
                "length limit must be positive",
            ));
        }
        if self.dangerous_filename_tokens.iter().any(String::is_empty) {
            return Err(PolicyError::invalid_field(
                "dangerous_filename_tokens",
                "tokens must not be empty",
            ));
        }
        if self.signature_header_len == 0 {
            return Err(PolicyError::invalid_field(
                "signature_header_len",
                "header length must be positive",
            ));
        }
        if self.content_scan_limit == 0 {
            return Err(PolicyError::invalid_field(
                "content_scan_limit",
                "scan limit must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.obfuscation_threshold) {
            return Err(PolicyError::invalid_field(
                "obfuscation_threshold",
                format!("{} is outside 0.0..=1.0", self.obfuscation_threshold),
            ));
        }
        if self.dangerous_signatures.iter().any(|s| s.bytes.is_empty()) {
            return Err(PolicyError::invalid_field(
                "dangerous_signatures",
                "signatures must not be empty",
            ));
        }
        Ok(())
    }
}
