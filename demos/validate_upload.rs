//! Upload validation example.
//!
//! This example shows how to:
//! - Build a FileValidator with a policy and a malware scanner
//! - Validate a few uploads and handle the outcomes
//! - Apply a deadline from async code
//!
//! Run with: cargo run --example validate_upload

use docgate::backends::MockScanner;
use docgate::prelude::*;
use docgate::validate_with_timeout;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; audit events go to the `docgate::audit` target
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== Docgate Upload Validation Example ===\n");

    let policy = ValidationPolicy::default()
        .with_max_file_size(10 * 1024 * 1024)
        .with_file_scanning(true);

    let validator = FileValidator::builder()
        .policy(policy)
        .malware_scanner(MockScanner::clean().with_name("example-scanner"))
        .build()?;

    let uploads: Vec<(&str, &[u8])> = vec![
        ("meeting notes.txt", b"Agenda: budget review, hiring plan.\n".as_slice()),
        ("invoice.exe.pdf", b"%PDF-1.4\n%%EOF\n".as_slice()),
        ("report.pdf", b"MZ\x90\x00\x03\x00\x00\x00\x04\x00\x00\x00\xff\xff".as_slice()),
        ("links.pdf", b"%PDF-1.7\n1 0 obj << /URI (https://example.com) >>\n%%EOF\n".as_slice()),
        ("what?.md", b"# Title\n\nSome *markdown* text.\n".as_slice()),
    ];

    for (name, content) in &uploads {
        let mut tmp = tempfile::NamedTempFile::new()?;
        tmp.write_all(content)?;
        let file = UploadedFile::from_path(tmp.path(), *name)?;

        let report = validator.validate_report(&file);
        println!("{} ({} bytes)", name, report.byte_length);
        match report.outcome.error() {
            None => {
                println!("  accepted as {:?}", report.outcome.sanitized_filename());
                println!("  sha256 {}", report.sha256.as_deref().unwrap_or("-"));
            }
            Some(error) => {
                println!("  rejected [{}]: {}", error.kind(), error);
            }
        }
        for warning in report.outcome.warnings() {
            println!("  warning: {}", warning);
        }
        println!();
    }

    // A slow engine under a deadline
    let slow = FileValidator::builder()
        .policy(ValidationPolicy::default().with_file_scanning(true))
        .malware_scanner(MockScanner::clean().with_latency(Duration::from_millis(300)))
        .build()?;
    let mut tmp = tempfile::NamedTempFile::new()?;
    tmp.write_all(b"Short note for the slow scanner.\n")?;
    let file = UploadedFile::from_path(tmp.path(), "slow.txt")?;

    let outcome = validate_with_timeout(Arc::new(slow), file, Duration::from_millis(50)).await;
    println!("slow.txt with 50 ms deadline: {:?}", outcome.error_message());

    Ok(())
}
