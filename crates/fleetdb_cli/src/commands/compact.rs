//! Compact command implementation.

use super::{CommandResult, OutputFormat, Session};
use serde::Serialize;
use std::path::Path;

/// Compaction statistics.
#[derive(Debug, Serialize)]
pub struct CompactStats {
    /// Rows read from the snapshot.
    pub rows_loaded: usize,
    /// Rows dropped while loading in lenient mode.
    pub rows_skipped: usize,
    /// Store slots before compaction.
    pub input_slots: usize,
    /// Store slots after compaction.
    pub output_slots: usize,
    /// Drivers written back.
    pub written: Option<usize>,
    /// Bytes before compaction.
    pub bytes_before: u64,
    /// Bytes after compaction.
    pub bytes_after: Option<u64>,
}

/// Runs the compact command.
///
/// Loads the snapshot, compacts the registry and writes it back in the
/// full layout. Lenient loads drop malformed rows from the rewritten file.
pub fn run(path: &Path, session: &Session, dry_run: bool) -> CommandResult {
    let mut loaded = session.load(path)?;
    let bytes_before = std::fs::metadata(path)?.len();
    let compaction = loaded.registry.compact();

    let mut stats = CompactStats {
        rows_loaded: loaded.report.loaded,
        rows_skipped: loaded.report.skipped.len(),
        input_slots: compaction.input_slots,
        output_slots: compaction.output_slots,
        written: None,
        bytes_before,
        bytes_after: None,
    };

    if !dry_run {
        stats.written = Some(loaded.snapshot.save(&loaded.registry)?);
        stats.bytes_after = Some(std::fs::metadata(path)?.len());
    }

    match session.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Text => {
            println!("Compacting snapshot at {}", path.display());
            if dry_run {
                println!("(dry run - no changes will be made)");
            }
            println!();
            println!("  Rows loaded:  {}", stats.rows_loaded);
            println!("  Rows skipped: {}", stats.rows_skipped);
            println!("  Slots:        {compaction}");
            println!("  Size before:  {} bytes", stats.bytes_before);
            if let (Some(written), Some(after)) = (stats.written, stats.bytes_after) {
                println!("  Size after:   {after} bytes");
                println!();
                println!("✓ Wrote {written} drivers");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(lenient: bool) -> Session {
        Session {
            cell_size: 1.0,
            lenient,
            format: OutputFormat::Json,
        }
    }

    #[test]
    fn rewrites_legacy_and_drops_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drivers.csv");
        std::fs::write(
            &path,
            "ID,Name,Rating,X,Y,TotalRides\n1,Le Thi Linh,4.4,1.0,1.0,12\n2,Broken,abc,0,0,1\n",
        )
        .unwrap();

        assert!(run(&path, &session(false), false).is_err());
        run(&path, &session(true), true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("ID,Name"));

        run(&path, &session(true), false).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("id,name,rating"));
        assert_eq!(text.lines().count(), 2);
    }
}
