//! Generate command implementation.

use super::{CommandResult, OutputFormat, Session};
use fleetdb_core::{DriverRecord, Location};
use fleetdb_storage::{FileBackend, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;

const FAMILY_NAMES: [&str; 10] = [
    "Nguyen", "Tran", "Le", "Pham", "Hoang", "Vo", "Dang", "Bui", "Ngo", "Truong",
];
const MIDDLE_NAMES: [&str; 10] = [
    "Van", "Thi", "Duc", "Minh", "Quang", "Thanh", "Manh", "Quoc", "Hong", "Tuan",
];
const GIVEN_NAMES: [&str; 20] = [
    "An", "Binh", "Cuong", "Dung", "Em", "Phong", "Giang", "Hai", "Khoa", "Lam", "Hoa", "Lan",
    "Linh", "Nga", "Huong", "Tam", "Tuan", "Hung", "Duc", "Thao",
];

/// Generation summary.
#[derive(Debug, Serialize)]
pub struct GenerateResult {
    /// Snapshot path.
    pub path: String,
    /// Drivers written.
    pub written: usize,
    /// Seed used.
    pub seed: u64,
}

/// Runs the generate command.
pub fn run(
    path: &Path,
    session: &Session,
    count: u64,
    seed: Option<u64>,
    force: bool,
) -> CommandResult {
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut rng = StdRng::seed_from_u64(seed);

    let registry = session.registry()?;
    for record in drivers(&mut rng, count) {
        registry.add(record)?;
    }

    let mut snapshot = Snapshot::new(FileBackend::with_create_dirs(path)?);
    let written = snapshot.save(&registry)?;

    let result = GenerateResult {
        path: path.display().to_string(),
        written,
        seed,
    };
    match session.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("Generated {} drivers (seed {})", result.written, result.seed);
            println!("  -> {}", result.path);
        }
    }

    Ok(())
}

/// Produces `count` synthetic drivers with ids `1..=count`.
pub fn drivers(rng: &mut impl Rng, count: u64) -> Vec<DriverRecord> {
    (1..=count)
        .map(|id| {
            let x = round_tenth(rng.gen_range(0.0..=10.0));
            let y = round_tenth(rng.gen_range(0.0..=10.0));
            let location = Location::new(x, y);
            DriverRecord::new(id, name(rng), location)
                .with_rating(round_tenth(rng.gen_range(3.5..=5.0)))
                .with_total_rides(rng.gen_range(10..=80))
        })
        .collect()
}

fn name(rng: &mut impl Rng) -> String {
    format!(
        "{} {} {}",
        FAMILY_NAMES[rng.gen_range(0..FAMILY_NAMES.len())],
        MIDDLE_NAMES[rng.gen_range(0..MIDDLE_NAMES.len())],
        GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())],
    )
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_drivers() {
        let a = drivers(&mut StdRng::seed_from_u64(7), 50);
        let b = drivers(&mut StdRng::seed_from_u64(7), 50);
        assert_eq!(a, b);
    }

    #[test]
    fn generated_fields_stay_in_range() {
        let drivers = drivers(&mut StdRng::seed_from_u64(1), 200);
        assert_eq!(drivers.len(), 200);

        for (i, driver) in drivers.iter().enumerate() {
            assert_eq!(driver.id().as_u64(), i as u64 + 1);
            assert!(driver.validate().is_ok());
            assert!((3.5..=5.0).contains(&driver.rating()));
            assert!((10..=80).contains(&driver.total_rides()));
            let Location { x, y } = driver.location();
            assert!((0.0..=10.0).contains(&x) && (0.0..=10.0).contains(&y));
            assert_eq!(driver.name().split(' ').count(), 3);
        }
    }

    #[test]
    fn writes_a_loadable_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("drivers.csv");
        let session = Session {
            cell_size: 1.0,
            lenient: false,
            format: OutputFormat::Text,
        };

        run(&path, &session, 25, Some(3), false).unwrap();
        let loaded = session.load(&path).unwrap();
        assert_eq!(loaded.report.loaded, 25);
        assert!(loaded.registry.verify().is_empty());

        // Refuses to clobber without --force.
        assert!(run(&path, &session, 5, Some(3), false).is_err());
        run(&path, &session, 5, Some(3), true).unwrap();
        assert_eq!(session.load(&path).unwrap().registry.count(), 5);
    }
}
