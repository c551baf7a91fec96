//! Structured audit logging.
//!
//! This module provides functions for emitting structured audit events
//! using the `tracing` crate, under the `docgate::audit` target. Events can
//! be captured by any tracing subscriber (JSON file, OpenTelemetry, etc.).
//! The library never installs a subscriber itself.

mod events;

pub use events::{
    emit_validation_completed, emit_validation_started, AuditEvent, ValidationAuditEvent,
    AUDIT_TARGET,
};
