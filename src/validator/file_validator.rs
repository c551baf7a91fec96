//! The main validator implementation.

use crate::audit::{emit_validation_completed, emit_validation_started};
use crate::backends::MagicSniffer;
use crate::core::{
    ArcScanner, ArcSniffer, DocumentFormat, FileHasher, MalwareScanner, MimeSniffer, PolicyError,
    StageResult, UploadedFile, ValidationError, ValidationOutcome, ValidationReport,
};
use crate::policy::ValidationPolicy;
use crate::stages::{
    check_extension, check_filename, check_mime, check_signature, check_size,
    inspect_docx_entries, inspect_pdf_features, run_malware_scan, sanitize_filename_with,
    ContentScanner,
};

use chrono::Utc;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// Builder for creating a `FileValidator`.
#[derive(Default)]
pub struct FileValidatorBuilder {
    policy: Option<ValidationPolicy>,
    sniffer: Option<ArcSniffer>,
    scanner: Option<ArcScanner>,
}

impl FileValidatorBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the policy. Defaults to [`ValidationPolicy::default`].
    pub fn policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Sets the MIME sniffer. Defaults to [`MagicSniffer`].
    pub fn mime_sniffer<S: MimeSniffer + 'static>(mut self, sniffer: S) -> Self {
        self.sniffer = Some(Arc::new(sniffer));
        self
    }

    /// Sets a MIME sniffer wrapped in an Arc.
    pub fn arc_mime_sniffer(mut self, sniffer: ArcSniffer) -> Self {
        self.sniffer = Some(sniffer);
        self
    }

    /// Sets the malware scanner. Only called when the policy enables
    /// scanning.
    pub fn malware_scanner<S: MalwareScanner + 'static>(mut self, scanner: S) -> Self {
        self.scanner = Some(Arc::new(scanner));
        self
    }

    /// Sets a malware scanner wrapped in an Arc.
    pub fn arc_malware_scanner(mut self, scanner: ArcScanner) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Builds the validator.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` if the policy fails [`ValidationPolicy::validate`].
    pub fn build(self) -> Result<FileValidator, PolicyError> {
        let policy = self.policy.unwrap_or_default();
        policy.validate()?;

        let sniffer = self
            .sniffer
            .unwrap_or_else(|| Arc::new(MagicSniffer::new()));

        tracing::debug!(
            sniffer = %sniffer.name(),
            scanner = ?self.scanner.as_ref().map(|s| s.name().to_string()),
            scanning_enabled = policy.enable_file_scanning,
            "file validator built"
        );

        Ok(FileValidator {
            policy: Arc::new(policy),
            sniffer,
            scanner: self.scanner,
            content: ContentScanner::new()?,
            hasher: FileHasher::new(),
        })
    }
}

/// Validates uploaded documents against a [`ValidationPolicy`].
///
/// Stages run in a fixed order and the first failure wins. Warnings from
/// stages that passed are kept in both accepted and rejected outcomes.
///
/// The MIME stage runs before the signature stage. With the default
/// [`MagicSniffer`], an executable uploaded under a document name is
/// therefore rejected with a MIME error (`application/x-dosexec` is not an
/// allowed type). Only when MIME detection is unavailable, as with
/// `NullSniffer`, does the same upload reach the signature blocklist and
/// fail as a dangerous signature.
///
/// # Example
///
/// ```rust
/// use docgate::backends::NullSniffer;
/// use docgate::core::UploadedFile;
/// use docgate::FileValidator;
///
/// let validator = FileValidator::builder().mime_sniffer(NullSniffer).build()?;
///
/// let file = UploadedFile::new("/tmp/never-read", "../../etc/passwd.txt", 20);
/// let outcome = validator.validate(&file);
/// assert!(!outcome.is_valid());
/// # Ok::<(), docgate::core::PolicyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileValidator {
    policy: Arc<ValidationPolicy>,
    sniffer: ArcSniffer,
    scanner: Option<ArcScanner>,
    content: ContentScanner,
    hasher: FileHasher,
}

impl FileValidator {
    /// Creates a new builder.
    pub fn builder() -> FileValidatorBuilder {
        FileValidatorBuilder::new()
    }

    /// Creates a validator with the default policy, [`MagicSniffer`] and no
    /// malware scanner.
    pub fn with_defaults() -> Result<Self, PolicyError> {
        Self::builder().build()
    }

    /// Returns the policy.
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Returns the configured sniffer.
    pub fn mime_sniffer(&self) -> &dyn MimeSniffer {
        self.sniffer.as_ref()
    }

    /// Returns the configured scanner, if any.
    pub fn malware_scanner(&self) -> Option<&dyn MalwareScanner> {
        self.scanner.as_deref()
    }

    /// Validates one upload.
    pub fn validate(&self, file: &UploadedFile) -> ValidationOutcome {
        self.evaluate(file, false).outcome
    }

    /// Validates one upload and returns the outcome with diagnostics. The
    /// SHA-256 of the content is computed for accepted uploads.
    pub fn validate_report(&self, file: &UploadedFile) -> ValidationReport {
        self.evaluate(file, true)
    }

    fn evaluate(&self, file: &UploadedFile, compute_hash: bool) -> ValidationReport {
        let id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let start = Instant::now();
        emit_validation_started(&id, file);

        let mut warnings = Vec::new();
        let mut detected_mime = None;
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.run_stages(file, &mut warnings, &mut detected_mime)
        }))
        .unwrap_or_else(|payload| {
            Err(ValidationError::structural(format!(
                "unexpected failure while inspecting file: {}",
                panic_message(payload.as_ref())
            )))
        });

        let mut sha256 = None;
        let outcome = match result {
            Ok(sanitized) => {
                if compute_hash {
                    match self.hasher.hash_file(file.path()) {
                        Ok(digest) => sha256 = Some(digest),
                        Err(e) => {
                            tracing::warn!(error = %e, "could not hash accepted upload");
                        }
                    }
                }
                ValidationOutcome::accepted(sanitized, warnings)
            }
            Err(error) => {
                tracing::debug!(
                    filename = %file.declared_filename(),
                    kind = %error.kind(),
                    error = %error,
                    "upload rejected"
                );
                ValidationOutcome::rejected(error, warnings)
            }
        };

        let report = ValidationReport {
            id,
            outcome,
            declared_filename: file.declared_filename().to_string(),
            byte_length: file.byte_length(),
            detected_mime,
            sha256,
            started_at,
            duration: start.elapsed(),
        };
        emit_validation_completed(&report);
        report
    }

    /// Runs every stage in order and returns the sanitized filename.
    fn run_stages(
        &self,
        file: &UploadedFile,
        warnings: &mut Vec<String>,
        detected_mime: &mut Option<String>,
    ) -> StageResult<String> {
        let policy = self.policy.as_ref();
        let filename = file.declared_filename();

        check_filename(filename, policy, warnings)?;
        stage_passed("filename", file);

        check_size(file.byte_length(), policy)?;
        stage_passed("size", file);

        let extension = file.extension();
        check_extension(extension.as_deref(), policy)?;
        let extension = extension.unwrap_or_default();
        let format = DocumentFormat::from_extension(&extension);
        stage_passed("extension", file);

        ensure_readable(file)?;

        *detected_mime = check_mime(file, &extension, self.sniffer.as_ref(), policy, warnings)?;
        stage_passed("mime", file);

        check_signature(file, &extension, policy)?;
        stage_passed("signature", file);

        // one extra byte tells a cut prefix apart from a file of exactly the limit
        let mut prefix = file.read_prefix(policy.content_scan_limit.saturating_add(1))?;
        let truncated = prefix.len() > policy.content_scan_limit;
        prefix.truncate(policy.content_scan_limit);
        self.content
            .scan(&prefix, format, truncated, policy, warnings)?;
        drop(prefix);
        stage_passed("content", file);

        match format {
            Some(DocumentFormat::Pdf) => inspect_pdf_features(file.path(), warnings)?,
            Some(DocumentFormat::Docx) => inspect_docx_entries(file.path(), warnings)?,
            _ => {}
        }
        stage_passed("embedded", file);

        run_malware_scan(self.scanner.as_deref(), file, policy, warnings)?;
        stage_passed("malware", file);

        Ok(sanitize_filename_with(filename, policy))
    }
}

fn stage_passed(stage: &'static str, file: &UploadedFile) {
    tracing::debug!(stage, filename = %file.declared_filename(), "stage passed");
}

/// Maps a missing or unreadable file to a structural error before any
/// content stage touches it.
fn ensure_readable(file: &UploadedFile) -> StageResult {
    match std::fs::metadata(file.path()) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ValidationError::structural(format!(
            "not a regular file: {}",
            file.path().display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ValidationError::structural(
            format!("file not found: {}", file.path().display()),
        )),
        Err(e) => Err(e.into()),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{FailClosed, FixedSniffer, MockScanner, NullSniffer};
    use crate::core::{
        ErrorKind, FilenameError, ScanError, ScanOutcome, SignatureError, SizeError,
    };
    use crate::policy::table::DOCX_MIME;
    use crate::test_support::{docx_bytes, pdf_bytes, temp_upload, zip_bytes};
    use std::path::Path;

    fn validator() -> FileValidator {
        FileValidator::with_defaults().unwrap()
    }

    fn validate(bytes: &[u8], name: &str) -> ValidationOutcome {
        let (_tmp, file) = temp_upload(bytes, name);
        validator().validate(&file)
    }

    #[test]
    fn test_scenario_plain_text_without_sniffer() {
        let validator = FileValidator::builder().mime_sniffer(NullSniffer).build().unwrap();
        let (_tmp, file) = temp_upload(b"hello world, again!\n", "notes.txt");
        assert_eq!(file.byte_length(), 20);

        let outcome = validator.validate(&file);
        assert!(outcome.is_valid(), "{:?}", outcome);
        assert_eq!(outcome.sanitized_filename(), Some("notes.txt"));
        assert_eq!(outcome.warnings().len(), 1);
        assert!(outcome.warnings()[0].starts_with("MIME validation skipped"));
    }

    #[test]
    fn test_scenario_pe_disguised_as_pdf() {
        let outcome = validate(b"MZ\x90\x00\x03\x00\x00\x00\x04\x00\x00\x00\xff\xff", "report.pdf");
        assert!(!outcome.is_valid());
        // the sniffer sees an executable before the signature stage does
        assert_eq!(outcome.error_kind(), Some(ErrorKind::MimeError));

        let validator = FileValidator::builder().mime_sniffer(NullSniffer).build().unwrap();
        let (_tmp, file) = temp_upload(b"MZ\x90\x00\x03\x00\x00\x00\x04\x00\x00\x00", "report.pdf");
        let outcome = validator.validate(&file);
        assert_eq!(
            outcome.error(),
            Some(&ValidationError::Signature(SignatureError::Dangerous {
                description: "Executable file (PE)".into()
            }))
        );
    }

    #[test]
    fn test_sanitized_name_follows_policy() {
        let mut policy = ValidationPolicy::default();
        policy.reserved_names.retain(|name| name != "CON");
        let validator = FileValidator::builder()
            .policy(policy)
            .mime_sniffer(NullSniffer)
            .build()
            .unwrap();
        let (_tmp, file) = temp_upload(b"quarterly numbers, nothing odd\n", "con.txt");
        let outcome = validator.validate(&file);
        assert!(outcome.is_valid(), "{:?}", outcome);
        assert_eq!(outcome.sanitized_filename(), Some("con.txt"));
    }

    #[test]
    fn test_dangling_lead_byte_at_exact_scan_limit() {
        let limit = ValidationPolicy::default().content_scan_limit;
        let mut bytes = vec![b'a'; limit - 1];
        bytes.push(0xC3);
        assert_eq!(bytes.len(), limit);

        let outcome = validate(&bytes, "notes.txt");
        assert!(!outcome.is_valid());
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ContentPatternError));
        assert!(outcome
            .error_message()
            .unwrap()
            .contains("Invalid text encoding"));
    }

    #[test]
    fn test_sequence_cut_by_scan_limit_is_tolerated() {
        let limit = ValidationPolicy::default().content_scan_limit;
        let mut bytes = vec![b'a'; limit - 1];
        bytes.extend_from_slice("\u{e9}".as_bytes());
        assert_eq!(bytes.len(), limit + 1);

        let outcome = validate(&bytes, "notes.txt");
        assert!(outcome.is_valid(), "{:?}", outcome);
    }

    #[test]
    fn test_scenario_oversized_pdf() {
        let (_tmp, file) = temp_upload(&pdf_bytes(""), "big.pdf");
        let file = UploadedFile::new(file.path(), "big.pdf", 157_286_400);
        let outcome = validator().validate(&file);

        assert_eq!(
            outcome.error(),
            Some(&ValidationError::Size(SizeError::TooLarge {
                size: 157_286_400,
                max: 104_857_600
            }))
        );
        let message = outcome.error_message().unwrap();
        assert!(message.contains("157286400"));
        assert!(message.contains("104857600"));
    }

    #[test]
    fn test_scenario_path_traversal() {
        let outcome = validate(b"perfectly ordinary text\n", "../../etc/passwd.txt");
        assert_eq!(
            outcome.error(),
            Some(&ValidationError::Filename(FilenameError::PathTraversal))
        );
    }

    #[test]
    fn test_scenario_docx_missing_rels() {
        let bytes = zip_bytes(&[
            ("[Content_Types].xml", b"<Types/>".as_slice()),
            ("word/document.xml", b"<w:document/>".as_slice()),
        ]);
        let outcome = validate(&bytes, "letter.docx");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ContainerStructureError));
    }

    #[test]
    fn test_scenario_reserved_name() {
        let outcome = validate(&pdf_bytes(""), "CON.pdf");
        assert_eq!(
            outcome.error(),
            Some(&ValidationError::Filename(FilenameError::ReservedName {
                stem: "CON".into()
            }))
        );
    }

    #[test]
    fn test_valid_docx_is_accepted() {
        let (_tmp, file) = temp_upload(&docx_bytes(&[]), "Quarterly Report.docx");
        let report = validator().validate_report(&file);

        assert!(report.is_valid(), "{:?}", report.outcome);
        assert_eq!(report.detected_mime.as_deref(), Some(DOCX_MIME));
        assert_eq!(
            report.outcome.sanitized_filename(),
            Some("Quarterly Report.docx")
        );
        assert!(report
            .outcome
            .warnings()
            .contains(&"Document contains external references".to_string()));
        assert_eq!(report.sha256.as_ref().map(|s| s.len()), Some(64));
    }

    #[test]
    fn test_docx_missing_document_part() {
        let bytes = zip_bytes(&[
            ("[Content_Types].xml", b"<Types/>".as_slice()),
            ("_rels/.rels", b"<Relationships/>".as_slice()),
            ("word/styles.xml", b"<w:styles/>".as_slice()),
        ]);
        let validator = FileValidator::builder()
            .mime_sniffer(FixedSniffer::new(DOCX_MIME))
            .build()
            .unwrap();
        let (_tmp, file) = temp_upload(&bytes, "letter.docx");
        let outcome = validator.validate(&file);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ContainerStructureError));
        assert!(outcome
            .error_message()
            .unwrap()
            .contains("word/document.xml"));
    }

    #[test]
    fn test_pdf_launch_rejected() {
        let outcome = validate(&pdf_bytes("/OpenAction << /S /Launch /F (calc.exe) >>"), "a.pdf");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::EmbeddedThreatError));
    }

    #[test]
    fn test_pdf_uri_accepted_with_warnings() {
        let outcome = validate(&pdf_bytes("/URI (https://example.com)"), "a.pdf");
        assert!(outcome.is_valid(), "{:?}", outcome);
        assert!(!outcome.warnings().is_empty());
    }

    #[test]
    fn test_docx_with_macros_rejected() {
        let bytes = docx_bytes(&[("word/vbaProject.bin", b"\x00\x01\x02".as_slice())]);
        let outcome = validate(&bytes, "invoice.docx");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::EmbeddedThreatError));
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("Documents with macros are not allowed")
        );
    }

    #[test]
    fn test_text_with_script_rejected() {
        let outcome = validate(b"# Notes\n<script>alert('x')</script>\n", "notes.md");
        assert_eq!(outcome.error_kind(), Some(ErrorKind::ContentPatternError));
    }

    #[test]
    fn test_missing_file_is_structural() {
        let file = UploadedFile::new("/definitely/not/here.txt", "here.txt", 100);
        let outcome = validator().validate(&file);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::StructuralError));
    }

    #[test]
    fn test_warnings_kept_on_rejection() {
        let validator = FileValidator::builder().mime_sniffer(NullSniffer).build().unwrap();
        let (_tmp, file) = temp_upload(b"MZ\x90\x00\x03\x00\x00\x00\x04\x00", "what?.pdf");
        let outcome = validator.validate(&file);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.warnings().len(), 2);
        assert!(outcome.sanitized_filename().is_none());
    }

    #[test]
    fn test_sanitized_name_for_special_characters() {
        let outcome = validate(b"plain words only here\n", "draft<1>.txt");
        assert!(outcome.is_valid(), "{:?}", outcome);
        assert_eq!(outcome.sanitized_filename(), Some("draft_1_.txt"));
    }

    #[test]
    fn test_malware_scan_is_policy_gated() {
        let scanner = Arc::new(MockScanner::infected("Eicar-Test-Signature"));
        let disabled = FileValidator::builder()
            .arc_malware_scanner(scanner.clone())
            .build()
            .unwrap();
        let (_tmp, file) = temp_upload(b"hello there, world\n", "a.txt");
        assert!(disabled.validate(&file).is_valid());
        assert_eq!(scanner.scan_count(), 0);

        let enabled = FileValidator::builder()
            .policy(ValidationPolicy::default().with_file_scanning(true))
            .arc_malware_scanner(scanner.clone())
            .build()
            .unwrap();
        let outcome = enabled.validate(&file);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::MalwareDetected));
        assert_eq!(scanner.scan_count(), 1);
    }

    #[test]
    fn test_scanner_failure_fail_open_and_fail_closed() {
        let policy = ValidationPolicy::default().with_file_scanning(true);
        let (_tmp, file) = temp_upload(b"hello there, world\n", "a.txt");

        let open = FileValidator::builder()
            .policy(policy.clone())
            .malware_scanner(MockScanner::failing("clamd down"))
            .build()
            .unwrap();
        let outcome = open.validate(&file);
        assert!(outcome.is_valid());
        assert!(outcome
            .warnings()
            .iter()
            .any(|w| w.contains("could not be completed")));

        let closed = FileValidator::builder()
            .policy(policy)
            .malware_scanner(FailClosed::new(MockScanner::failing("clamd down")))
            .build()
            .unwrap();
        assert_eq!(
            closed.validate(&file).error_kind(),
            Some(ErrorKind::MalwareDetected)
        );
    }

    #[derive(Debug)]
    struct PanickingScanner;

    impl MalwareScanner for PanickingScanner {
        fn name(&self) -> &str {
            "panicky"
        }

        fn scan(&self, _path: &Path) -> Result<ScanOutcome, ScanError> {
            panic!("decoder exploded")
        }
    }

    #[test]
    fn test_panics_become_structural_errors() {
        let validator = FileValidator::builder()
            .policy(ValidationPolicy::default().with_file_scanning(true))
            .malware_scanner(PanickingScanner)
            .build()
            .unwrap();
        let (_tmp, file) = temp_upload(b"hello there, world\n", "a.txt");
        let outcome = validator.validate(&file);
        assert_eq!(outcome.error_kind(), Some(ErrorKind::StructuralError));
        assert!(outcome.error_message().unwrap().contains("decoder exploded"));
    }

    #[test]
    fn test_report_hash_only_on_acceptance() {
        let validator = validator();
        let (_tmp, file) = temp_upload(b"hello there, world\n", "a.txt");
        let first = validator.validate_report(&file);
        let second = validator.validate_report(&file);
        assert_eq!(first.sha256, second.sha256);
        assert!(first.sha256.is_some());
        assert_ne!(first.id, second.id);

        let (_tmp, bad) = temp_upload(b"hello there, world\n", "a.exe");
        assert!(validator.validate_report(&bad).sha256.is_none());
    }

    #[test]
    fn test_invalid_policy_rejected_at_build() {
        let policy = ValidationPolicy::default().with_min_file_size(10).with_max_file_size(5);
        assert!(FileValidator::builder().policy(policy).build().is_err());
    }

    #[test]
    fn test_validator_is_shareable_across_threads() {
        let validator = Arc::new(validator());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let validator = Arc::clone(&validator);
                std::thread::spawn(move || {
                    let body = format!("thread {} says hello to everyone\n", i);
                    let (_tmp, file) = temp_upload(body.as_bytes(), "t.txt");
                    validator.validate(&file).is_valid()
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
