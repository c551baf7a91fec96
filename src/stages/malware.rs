//! The malware-scan gateway.

use crate::core::error::{StageResult, ValidationError};
use crate::core::traits::MalwareScanner;
use crate::core::types::ScanOutcome;
use crate::core::UploadedFile;
use crate::policy::ValidationPolicy;

/// Warning added when scanning is enabled but no engine was configured.
pub const NO_SCANNER_WARNING: &str = "Malware scan skipped: no scanner configured";

/// Runs the configured scanner when the policy enables scanning.
///
/// An infected verdict rejects the file. A scanner failure does not: the
/// stage fails open, logs the failure and records a warning. Wrap the
/// scanner in [`crate::backends::FailClosed`] to reject instead.
pub fn run_malware_scan(
    scanner: Option<&dyn MalwareScanner>,
    file: &UploadedFile,
    policy: &ValidationPolicy,
    warnings: &mut Vec<String>,
) -> StageResult {
    if !policy.enable_file_scanning {
        return Ok(());
    }
    let Some(scanner) = scanner else {
        warnings.push(NO_SCANNER_WARNING.to_string());
        return Ok(());
    };

    match scanner.scan(file.path()) {
        Ok(ScanOutcome::Clean) => {
            tracing::debug!(engine = %scanner.name(), "malware scan clean");
            Ok(())
        }
        Ok(ScanOutcome::Infected { threats }) => {
            let names: Vec<&str> = threats.iter().map(|t| t.name.as_str()).collect();
            tracing::warn!(
                engine = %scanner.name(),
                threats = ?names,
                "malware detected"
            );
            Err(ValidationError::MalwareDetected {
                threats: names.join(", "),
            })
        }
        Err(e) => {
            tracing::warn!(
                engine = %scanner.name(),
                error = %e,
                "malware scan failed; continuing without a verdict"
            );
            warnings.push(format!("Malware scan could not be completed: {}", e));
            Ok(())
        }
    }
}
