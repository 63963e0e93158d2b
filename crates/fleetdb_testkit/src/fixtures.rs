//! Registry fixtures and snapshot helpers.
//!
//! Provides convenience functions for setting up test registries
//! and common test scenarios.

use fleetdb_core::{Registry, RegistryConfig};
use fleetdb_storage::{LoadOptions, LoadReport, Snapshot};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// File name used for snapshots inside a fixture's temp directory.
pub const SNAPSHOT_FILE: &str = "drivers.csv";

/// A test registry, optionally paired with a snapshot file that is
/// removed on drop.
pub struct TestRegistry {
    /// The registry instance.
    pub registry: Registry,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestRegistry {
    /// Creates an empty registry with the default configuration.
    pub fn memory() -> Self {
        Self {
            registry: Registry::new(),
            _temp_dir: None,
        }
    }

    /// Creates an empty registry with `config`.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            registry: Registry::with_config(config).expect("Invalid registry config"),
            _temp_dir: None,
        }
    }

    /// Creates an empty registry backed by a snapshot path in a fresh
    /// temp directory. The file does not exist until [`save`](Self::save).
    pub fn file() -> Self {
        Self {
            registry: Registry::new(),
            _temp_dir: Some(TempDir::new().expect("Failed to create temp directory")),
        }
    }

    /// Returns the snapshot path if file-backed, None otherwise.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join(SNAPSHOT_FILE))
    }

    /// Writes the registry to the fixture's snapshot file.
    pub fn save(&self) -> usize {
        let path = self.path().expect("In-memory fixture has no snapshot path");
        Snapshot::open(path)
            .save(&self.registry)
            .expect("Failed to save snapshot")
    }

    /// Loads the fixture's snapshot file into a fresh registry.
    pub fn reload(&self) -> (Registry, LoadReport) {
        let path = self.path().expect("In-memory fixture has no snapshot path");
        let registry = Registry::with_config(self.registry.config()).expect("Invalid config");
        let report = Snapshot::open(path)
            .load(&registry, LoadOptions::strict())
            .expect("Failed to load snapshot");
        (registry, report)
    }
}

impl std::ops::Deref for TestRegistry {
    type Target = Registry;

    fn deref(&self) -> &Self::Target {
        &self.registry
    }
}

/// Runs a test with a fresh in-memory registry.
///
/// # Example
///
/// ```rust
/// use fleetdb_core::{DriverRecord, Location};
/// use fleetdb_testkit::with_registry;
///
/// with_registry(|registry| {
///     registry.add(DriverRecord::new(1, "Vo Thi Nga", Location::new(0.0, 0.0))).unwrap();
///     assert_eq!(registry.count(), 1);
/// });
/// ```
pub fn with_registry<F, R>(f: F) -> R
where
    F: FnOnce(&Registry) -> R,
{
    let test = TestRegistry::memory();
    f(&test.registry)
}

/// Runs a test with a CSV file holding `contents`, removed afterwards.
pub fn with_csv_file<F, R>(contents: &str, f: F) -> R
where
    F: FnOnce(&Path) -> R,
{
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join(SNAPSHOT_FILE);
    std::fs::write(&path, contents).expect("Failed to write CSV fixture");
    f(&path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use fleetdb_core::{DriverRecord, Location};

    /// A handful of named drivers spread over a 10 x 10 area.
    pub fn sample_drivers() -> Vec<DriverRecord> {
        [
            (1, "Nguyen Van An", 4.8, 0.0, 0.0, 52),
            (2, "Tran Thi Lan", 4.9, 1.0, 1.0, 31),
            (3, "Le Minh Hai", 3.7, 3.0, 3.0, 12),
            (4, "Tran Van Binh", 4.2, 2.0, 2.0, 77),
            (5, "Pham Hong Linh", 4.5, 9.5, 0.5, 40),
            (6, "Hoang Quoc Lam", 3.9, 5.0, 8.0, 18),
            (7, "Ngo Thanh Thao", 5.0, 7.5, 7.5, 65),
        ]
        .into_iter()
        .map(|(id, name, rating, x, y, rides)| {
            DriverRecord::new(id, name, Location::new(x, y))
                .with_rating(rating)
                .with_total_rides(rides)
        })
        .collect()
    }

    /// Deterministic pseudo-random location in `[0, extent)²` for index `i`.
    pub fn scattered_location(i: u64, extent: f64) -> Location {
        // Two coprime strides keep neighbours in id far apart on the plane.
        let x = (i.wrapping_mul(7919) % 10_007) as f64 / 10_007.0;
        let y = (i.wrapping_mul(104_729) % 10_009) as f64 / 10_009.0;
        Location::new(x * extent, y * extent)
    }

    /// `count` drivers with ids `1..=count` scattered over `[0, extent)²`.
    pub fn scattered_drivers(count: u64, extent: f64) -> Vec<DriverRecord> {
        (1..=count)
            .map(|id| {
                let rating = (id % 51) as f64 / 10.0;
                DriverRecord::new(id, format!("Driver {id:05}"), scattered_location(id, extent))
                    .with_rating(rating)
            })
            .collect()
    }

    /// Creates a registry holding [`sample_drivers`].
    pub fn sample_registry() -> TestRegistry {
        populated(TestRegistry::memory(), sample_drivers())
    }

    /// Creates a registry holding `count` scattered drivers.
    pub fn populated_registry(count: u64, extent: f64) -> TestRegistry {
        populated(TestRegistry::memory(), scattered_drivers(count, extent))
    }

    /// Creates a file-backed registry holding [`sample_drivers`], already
    /// saved to its snapshot.
    pub fn saved_sample_registry() -> TestRegistry {
        let test = populated(TestRegistry::file(), sample_drivers());
        test.save();
        test
    }

    fn populated(test: TestRegistry, drivers: Vec<DriverRecord>) -> TestRegistry {
        for record in drivers {
            test.registry.add(record).expect("Failed to add driver");
        }
        test
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetdb_core::Location;

    #[test]
    fn sample_registry_is_consistent() {
        let test = scenarios::sample_registry();
        assert_eq!(test.count(), 7);
        assert!(test.verify().is_empty());
        assert_eq!(test.k_nearest(Location::new(0.0, 0.0), 1)[0].driver.id().as_u64(), 1);
    }

    #[test]
    fn saved_registry_reloads() {
        let test = scenarios::saved_sample_registry();
        let (reloaded, report) = test.reload();
        assert_eq!(report.loaded, 7);
        assert_eq!(reloaded.all(), test.all());
    }

    #[test]
    fn scattered_locations_stay_in_extent() {
        for i in 0..1_000 {
            let location = scenarios::scattered_location(i, 50.0);
            assert!((0.0..50.0).contains(&location.x));
            assert!((0.0..50.0).contains(&location.y));
        }
    }

    #[test]
    fn csv_file_fixture() {
        let count = with_csv_file("ID,Name,Rating,X,Y,TotalRides\n1,Bui Thi Hoa,4.0,1,1,20\n", |path| {
            let registry = Registry::new();
            Snapshot::open(path)
                .load(&registry, LoadOptions::strict())
                .unwrap()
                .loaded
        });
        assert_eq!(count, 1);
    }
}
