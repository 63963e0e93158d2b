//! Verify command implementation.

use super::{CommandResult, OutputFormat, Session};
use serde::Serialize;
use std::path::Path;

/// Verification result.
#[derive(Debug, Serialize)]
pub struct VerifyResult {
    /// Rows loaded.
    pub rows_loaded: usize,
    /// Rows that failed to load, with their line numbers.
    pub rows_skipped: Vec<String>,
    /// Index consistency violations.
    pub violations: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.rows_skipped.is_empty() && self.violations.is_empty()
    }
}

/// Runs the verify command.
///
/// Every row is checked: the load always runs leniently so all bad rows
/// are reported, not only the first.
pub fn run(path: &Path, session: &Session) -> CommandResult {
    let lenient = Session {
        lenient: true,
        ..session.clone()
    };
    let loaded = lenient.load(path)?;

    let result = VerifyResult {
        rows_loaded: loaded.report.loaded,
        rows_skipped: loaded
            .report
            .skipped
            .iter()
            .map(|row| format!("line {}: {}", row.line, row.reason))
            .collect(),
        violations: loaded
            .registry
            .verify()
            .iter()
            .map(ToString::to_string)
            .collect(),
    };

    match session.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text_output(path, &result),
    }

    if result.is_ok() {
        Ok(())
    } else {
        Err("Verification failed".into())
    }
}

fn print_text_output(path: &Path, result: &VerifyResult) {
    println!("Verifying snapshot at {}", path.display());
    println!();
    println!("Rows loaded: {}", result.rows_loaded);
    for row in &result.rows_skipped {
        println!("  ✗ {row}");
    }
    println!("Index violations: {}", result.violations.len());
    for violation in &result.violations {
        println!("  ✗ {violation}");
    }
    println!();
    if result.is_ok() {
        println!("✓ Snapshot verification passed");
    } else {
        println!("✗ Snapshot verification failed");
    }
}
