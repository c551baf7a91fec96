//! Deadline helper for async callers.

use std::sync::Arc;
use std::time::Duration;

use crate::core::{UploadedFile, ValidationError, ValidationOutcome};
use crate::validator::FileValidator;

/// Runs [`FileValidator::validate`] on the blocking pool under a deadline.
///
/// On expiry the upload is rejected with a structural error. The blocking
/// task is not cancelled; it finishes in the background and its result is
/// discarded.
///
/// # Example
///
/// ```rust
/// use docgate::core::UploadedFile;
/// use docgate::{validate_with_timeout, FileValidator};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let validator = Arc::new(FileValidator::with_defaults()?);
/// let file = UploadedFile::new("/tmp/missing", "notes.txt", 64);
/// let outcome = validate_with_timeout(validator, file, Duration::from_secs(5)).await;
/// assert!(!outcome.is_valid());
/// # Ok(())
/// # }
/// ```
pub async fn validate_with_timeout(
    validator: Arc<FileValidator>,
    file: UploadedFile,
    timeout: Duration,
) -> ValidationOutcome {
    let filename = file.declared_filename().to_string();
    let task = tokio::task::spawn_blocking(move || validator.validate(&file));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_error)) => {
            tracing::warn!(filename = %filename, error = %join_error, "validation task failed");
            ValidationOutcome::rejected(
                ValidationError::structural(format!("validation task failed: {}", join_error)),
                Vec::new(),
            )
        }
        Err(_) => {
            tracing::warn!(
                filename = %filename,
                timeout_ms = timeout.as_millis() as u64,
                "validation timed out"
            );
            ValidationOutcome::rejected(
                ValidationError::structural(format!(
                    "validation timed out after {} ms",
                    timeout.as_millis()
                )),
                Vec::new(),
            )
        }
    }
}
