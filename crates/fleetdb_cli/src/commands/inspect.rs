//! Inspect command implementation.

use super::{CommandResult, OutputFormat, Session};
use fleetdb_core::RegistrySummary;
use serde::Serialize;
use std::path::Path;

/// Snapshot inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Snapshot path.
    pub path: String,
    /// Snapshot file size in bytes.
    pub file_size: u64,
    /// Detected header layout.
    pub layout: String,
    /// Rows loaded.
    pub loaded: usize,
    /// Rows skipped in lenient mode.
    pub skipped: usize,
    /// Active drivers.
    pub drivers: usize,
    /// Mean rating of active drivers.
    pub mean_rating: Option<f64>,
    /// Total rides across active drivers.
    pub total_rides: u64,
    /// Index sizes.
    pub indexes: IndexSizes,
}

/// Structural sizes of the rebuilt indexes.
#[derive(Debug, Serialize)]
pub struct IndexSizes {
    /// Nodes in the prefix trie.
    pub prefix_nodes: usize,
    /// Nodes in the suffix trie.
    pub substring_nodes: usize,
    /// `(suffix, id)` entries in the suffix trie.
    pub substring_entries: usize,
    /// Non-empty grid cells.
    pub occupied_cells: usize,
    /// Grid cell size.
    pub cell_size: f64,
}

impl From<&RegistrySummary> for IndexSizes {
    fn from(summary: &RegistrySummary) -> Self {
        Self {
            prefix_nodes: summary.prefix_nodes,
            substring_nodes: summary.substring_nodes,
            substring_entries: summary.substring_entries,
            occupied_cells: summary.occupied_cells,
            cell_size: summary.cell_size,
        }
    }
}

/// Runs the inspect command.
pub fn run(path: &Path, session: &Session) -> CommandResult {
    let loaded = session.load(path)?;
    let summary = loaded.registry.summary();
    let (rating_total, total_rides) = loaded.registry.read(|set| {
        set.iter()
            .fold((0.0, 0u64), |(rating, rides), driver| {
                (rating + driver.rating(), rides + driver.total_rides())
            })
    });

    let result = InspectResult {
        path: path.display().to_string(),
        file_size: std::fs::metadata(path)?.len(),
        layout: loaded
            .report
            .format
            .map_or_else(|| "empty".to_string(), |format| format.to_string()),
        loaded: loaded.report.loaded,
        skipped: loaded.report.skipped.len(),
        drivers: summary.active,
        mean_rating: (summary.active > 0).then(|| rating_total / summary.active as f64),
        total_rides,
        indexes: IndexSizes::from(&summary),
    };

    match session.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => print_text_output(&result),
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("FleetDB Snapshot Inspection");
    println!("===========================");
    println!();
    println!("Path:   {}", result.path);
    println!("Size:   {}", format_size(result.file_size));
    println!("Layout: {}", result.layout);
    println!();
    println!("Rows:");
    println!("  Loaded:  {}", result.loaded);
    println!("  Skipped: {}", result.skipped);
    println!();
    println!("Drivers:");
    println!("  Active:      {}", result.drivers);
    match result.mean_rating {
        Some(mean) => println!("  Mean rating: {mean:.2}"),
        None => println!("  Mean rating: -"),
    }
    println!("  Total rides: {}", result.total_rides);
    println!();
    println!("Indexes:");
    println!("  Prefix trie nodes:    {}", result.indexes.prefix_nodes);
    println!(
        "  Suffix trie nodes:    {} ({} entries)",
        result.indexes.substring_nodes, result.indexes.substring_entries
    );
    println!(
        "  Occupied grid cells:  {} (cell size {})",
        result.indexes.occupied_cells, result.indexes.cell_size
    );
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
