//! Audit event types and emission functions.

use crate::core::{UploadedFile, ValidationReport};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target under which every audit event is emitted.
pub const AUDIT_TARGET: &str = "docgate::audit";

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit record of one finished validation.
///
/// Mirrors the fields of the `validation_completed` event so a service can
/// persist the same data it logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationAuditEvent {
    /// When the validation started.
    pub timestamp: DateTime<Utc>,

    /// Unique validation ID.
    pub validation_id: String,

    /// Filename declared by the uploader.
    pub declared_filename: String,

    /// Size in bytes.
    pub byte_length: u64,

    /// `accepted` or `rejected`.
    pub outcome: String,

    /// Error kind, if rejected.
    pub error_kind: Option<String>,

    /// Error message, if rejected.
    pub error_message: Option<String>,

    /// Number of warnings collected.
    pub warning_count: usize,

    /// Storage name, if accepted.
    pub sanitized_filename: Option<String>,

    /// Sniffed MIME type, if any.
    pub detected_mime: Option<String>,

    /// SHA-256 of the content, if computed.
    pub sha256: Option<String>,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

impl From<&ValidationReport> for ValidationAuditEvent {
    fn from(report: &ValidationReport) -> Self {
        let outcome = &report.outcome;
        Self {
            timestamp: report.started_at,
            validation_id: report.id.clone(),
            declared_filename: report.declared_filename.clone(),
            byte_length: report.byte_length,
            outcome: outcome_label(report).to_string(),
            error_kind: outcome.error_kind().map(|kind| kind.as_str().to_string()),
            error_message: outcome.error_message(),
            warning_count: outcome.warnings().len(),
            sanitized_filename: outcome.sanitized_filename().map(str::to_string),
            detected_mime: report.detected_mime.clone(),
            sha256: report.sha256.clone(),
            duration_ms: report.duration.as_millis() as u64,
        }
    }
}

impl AuditEvent for ValidationAuditEvent {
    fn event_type(&self) -> &'static str {
        "validation_completed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

fn outcome_label(report: &ValidationReport) -> &'static str {
    if report.is_valid() {
        "accepted"
    } else {
        "rejected"
    }
}

/// Emits an audit event for a validation starting.
pub fn emit_validation_started(validation_id: &str, file: &UploadedFile) {
    tracing::info!(
        target: AUDIT_TARGET,
        event_type = "validation_started",
        validation_id = %validation_id,
        declared_filename = %file.declared_filename(),
        byte_length = file.byte_length(),
        "Validation started"
    );
}

/// Emits an audit event for a finished validation.
pub fn emit_validation_completed(report: &ValidationReport) {
    let outcome = &report.outcome;
    tracing::info!(
        target: AUDIT_TARGET,
        event_type = "validation_completed",
        validation_id = %report.id,
        declared_filename = %report.declared_filename,
        outcome = %outcome_label(report),
        error_kind = ?outcome.error_kind().map(|kind| kind.as_str()),
        error_message = ?outcome.error_message(),
        warning_count = outcome.warnings().len(),
        sanitized_filename = ?outcome.sanitized_filename(),
        detected_mime = ?report.detected_mime,
        sha256 = ?report.sha256,
        duration_ms = report.duration.as_millis() as u64,
        "Validation completed"
    );
}
