//! The validation pipeline.
//!
//! [`FileValidator`] binds a policy and its capabilities once and then
//! validates any number of uploads, concurrently if the caller wishes. It
//! holds no mutable state.

mod file_validator;

#[cfg(feature = "tokio-runtime")]
mod deadline;

pub use file_validator::{FileValidator, FileValidatorBuilder};

#[cfg(feature = "tokio-runtime")]
pub use deadline::validate_with_timeout;
