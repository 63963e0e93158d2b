//! CLI command implementations.

pub mod compact;
pub mod generate;
pub mod inspect;
pub mod nearby;
pub mod search;
pub mod top;
pub mod verify;

use clap::ValueEnum;
use fleetdb_core::{DriverRecord, Registry, RegistryConfig};
use fleetdb_storage::{FileBackend, LoadOptions, LoadReport, Snapshot};
use serde::Serialize;
use std::error::Error;
use std::path::Path;

/// Result type shared by every command.
pub type CommandResult<T = ()> = Result<T, Box<dyn Error>>;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Selection rule for `nearby --best`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BestBy {
    /// Highest rating within the radius
    Rated,
    /// Weighted proximity and rating
    Balanced,
}

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    /// Grid cell size for the loaded registry.
    pub cell_size: f64,
    /// Skip malformed rows while loading.
    pub lenient: bool,
    /// Output format.
    pub format: OutputFormat,
}

impl Session {
    /// Builds an empty registry with this session's configuration.
    pub fn registry(&self) -> CommandResult<Registry> {
        Ok(Registry::with_config(
            RegistryConfig::new().cell_size(self.cell_size),
        )?)
    }

    /// Loads the snapshot at `path` into a fresh registry.
    pub fn load(&self, path: &Path) -> CommandResult<Loaded> {
        if !path.exists() {
            return Err(format!("No snapshot found at {}", path.display()).into());
        }

        let registry = self.registry()?;
        let snapshot = Snapshot::open(path);
        let options = if self.lenient {
            LoadOptions::lenient()
        } else {
            LoadOptions::strict()
        };
        let report = snapshot.load(&registry, options)?;

        Ok(Loaded {
            registry,
            snapshot,
            report,
        })
    }
}

/// A registry loaded from a snapshot file.
pub struct Loaded {
    /// The populated registry.
    pub registry: Registry,
    /// The snapshot it was loaded from.
    pub snapshot: Snapshot<FileBackend>,
    /// What the load read and skipped.
    pub report: LoadReport,
}

/// A driver as printed by the CLI.
#[derive(Debug, Serialize)]
pub struct DriverView {
    /// Driver id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Current rating.
    pub rating: f64,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Lifetime ride count.
    pub total_rides: u64,
    /// Distance from the query point, for spatial queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Balanced score, for `nearby --best balanced`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl From<&DriverRecord> for DriverView {
    fn from(record: &DriverRecord) -> Self {
        let location = record.location();
        Self {
            id: record.id().as_u64(),
            name: record.name().to_string(),
            rating: record.rating(),
            x: location.x,
            y: location.y,
            total_rides: record.total_rides(),
            distance: None,
            score: None,
        }
    }
}

impl DriverView {
    /// Attaches a query distance.
    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Attaches a balanced score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Prints a list of drivers in the session's format.
pub fn print_drivers(format: OutputFormat, drivers: &[DriverView]) -> CommandResult {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(drivers)?);
        }
        OutputFormat::Text => {
            if drivers.is_empty() {
                println!("No drivers found");
                return Ok(());
            }
            for driver in drivers {
                print!(
                    "  [{:>5}] {:<24} {:.1}★ ({:.1}, {:.1}) {:>4} rides",
                    driver.id, driver.name, driver.rating, driver.x, driver.y, driver.total_rides
                );
                if let Some(distance) = driver.distance {
                    print!("  d={distance:.3}");
                }
                if let Some(score) = driver.score {
                    print!("  score={score:.3}");
                }
                println!();
            }
            println!();
            println!("{} driver(s)", drivers.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdb_core::Location;

    #[test]
    fn driver_view_copies_fields() {
        let record = DriverRecord::new(3, "Pham Minh Hai", Location::new(1.5, 2.5))
            .with_rating(4.2)
            .with_total_rides(17);
        let view = DriverView::from(&record).with_distance(0.5);

        assert_eq!(view.id, 3);
        assert_eq!(view.name, "Pham Minh Hai");
        assert_eq!((view.x, view.y), (1.5, 2.5));
        assert_eq!(view.total_rides, 17);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["distance"], 0.5);
        assert!(json.get("score").is_none());
    }

    #[test]
    fn load_rejects_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session {
            cell_size: 1.0,
            lenient: false,
            format: OutputFormat::Text,
        };
        assert!(session.load(&dir.path().join("nope.csv")).is_err());
    }
}
