//! Benchmark utilities.

use fleetdb_core::{DriverRecord, Location, Registry, RegistryConfig};
use rand::Rng;

const FAMILY: [&str; 8] = ["Nguyen", "Tran", "Le", "Pham", "Hoang", "Vo", "Dang", "Bui"];
const MIDDLE: [&str; 6] = ["Van", "Thi", "Duc", "Minh", "Quang", "Hong"];
const GIVEN: [&str; 10] = [
    "An", "Binh", "Cuong", "Dung", "Hai", "Khoa", "Lam", "Lan", "Linh", "Tam",
];

/// Generate a random location in `[0, extent)²`.
pub fn random_location(rng: &mut impl Rng, extent: f64) -> Location {
    Location::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent))
}

/// Generate `count` random drivers with ids `1..=count`.
pub fn generate_drivers(count: u64, extent: f64) -> Vec<DriverRecord> {
    let mut rng = rand::thread_rng();
    (1..=count)
        .map(|id| {
            let name = format!(
                "{} {} {}",
                FAMILY[rng.gen_range(0..FAMILY.len())],
                MIDDLE[rng.gen_range(0..MIDDLE.len())],
                GIVEN[rng.gen_range(0..GIVEN.len())],
            );
            DriverRecord::new(id, name, random_location(&mut rng, extent))
                .with_rating(rng.gen_range(0.0..=5.0))
                .with_total_rides(rng.gen_range(0..500))
        })
        .collect()
}

/// Build a registry with `count` random drivers over `[0, extent)²`.
pub fn populated_registry(count: u64, extent: f64, cell_size: f64) -> Registry {
    let registry = Registry::with_config(RegistryConfig::new().cell_size(cell_size))
        .expect("Invalid bench config");
    for record in generate_drivers(count, extent) {
        registry.add(record).expect("Failed to add driver");
    }
    registry
}
