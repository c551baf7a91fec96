//! Size and extension gates. Pure comparisons, no I/O.

use crate::core::error::{SizeError, StageResult, ValidationError};
use crate::policy::ValidationPolicy;

/// Rejects sizes outside `[min_file_size_bytes, max_file_size_bytes]`.
pub fn check_size(byte_length: u64, policy: &ValidationPolicy) -> StageResult {
    if byte_length > policy.max_file_size_bytes {
        return Err(SizeError::TooLarge {
            size: byte_length,
            max: policy.max_file_size_bytes,
        }
        .into());
    }
    if byte_length < policy.min_file_size_bytes {
        return Err(SizeError::TooSmall {
            size: byte_length,
            min: policy.min_file_size_bytes,
        }
        .into());
    }
    Ok(())
}

/// Rejects extensions that are not allowlisted. `extension` is the
/// lower-cased suffix with its dot, or `None` if the name has none.
pub fn check_extension(extension: Option<&str>, policy: &ValidationPolicy) -> StageResult {
    match extension {
        Some(ext) if policy.allows_extension(ext) => Ok(()),
        other => Err(ValidationError::Extension {
            extension: other.unwrap_or("").to_string(),
            allowed: policy.allowed_extensions_display(),
        }),
    }
}
