//! Validation policy: the immutable tables every stage reads.
//!
//! [`table`] holds the built-in constants; [`ValidationPolicy`] is the
//! injectable value built from them.

mod config;
pub mod table;

pub use config::{Signature, ValidationPolicy};
