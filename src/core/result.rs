//! Validation result structures.
//!
//! [`ValidationOutcome`] is the contract with the ingestion service.
//! [`ValidationReport`] wraps it with the diagnostics gathered on the way.

use crate::core::error::{ErrorKind, ValidationError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// The accept/reject decision for one upload.
///
/// Constructed only through [`ValidationOutcome::accepted`] and
/// [`ValidationOutcome::rejected`], so an accepted outcome always has a
/// sanitized filename and no error, and a rejected one always has exactly
/// one error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    is_valid: bool,
    error: Option<ValidationError>,
    warnings: Vec<String>,
    sanitized_filename: Option<String>,
}

impl ValidationOutcome {
    /// Creates an accepted outcome.
    pub fn accepted(sanitized_filename: impl Into<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: true,
            error: None,
            warnings,
            sanitized_filename: Some(sanitized_filename.into()),
        }
    }

    /// Creates a rejected outcome.
    ///
    /// `warnings` are those collected by stages that passed before the
    /// rejecting one; they are informational only.
    pub fn rejected(error: ValidationError, warnings: Vec<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(error),
            warnings,
            sanitized_filename: None,
        }
    }

    /// Returns `true` if the upload may be admitted.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Returns the terminal error of a rejection.
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Returns the error kind of a rejection.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ValidationError::kind)
    }

    /// Returns the user-facing rejection message.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Returns the non-fatal findings, in the order they were raised.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Returns the storage-safe filename of an accepted upload.
    pub fn sanitized_filename(&self) -> Option<&str> {
        self.sanitized_filename.as_deref()
    }

    /// Converts into a `Result`, keeping the warnings on both sides.
    pub fn into_result(self) -> Result<(String, Vec<String>), (ValidationError, Vec<String>)> {
        match (self.error, self.sanitized_filename) {
            (None, Some(name)) => Ok((name, self.warnings)),
            (Some(err), _) => Err((err, self.warnings)),
            (None, None) => Err((
                ValidationError::structural("outcome has neither error nor filename"),
                self.warnings,
            )),
        }
    }
}

/// A validation outcome plus diagnostics for audit and deduplication.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Unique identifier of this validation call.
    pub id: String,

    /// The decision.
    pub outcome: ValidationOutcome,

    /// The filename as declared by the uploader.
    pub declared_filename: String,

    /// Size in bytes.
    pub byte_length: u64,

    /// MIME type reported by the sniffer, if one ran and produced a value.
    pub detected_mime: Option<String>,

    /// SHA-256 of the content, computed only for accepted uploads.
    pub sha256: Option<String>,

    /// When the validation started.
    pub started_at: DateTime<Utc>,

    /// How long the validation took.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ValidationReport {
    /// Returns `true` if the upload was accepted.
    pub fn is_valid(&self) -> bool {
        self.outcome.is_valid()
    }
}

mod duration_millis {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }
}
