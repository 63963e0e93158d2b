//! Stress tests for FleetDB.
//!
//! These helpers drive a registry under heavy load and concurrent access.

use crate::fixtures::scenarios::{scattered_drivers, scattered_location};
use fleetdb_core::{DriverId, DriverUpdate, Location, Registry};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

/// Counts from one stress run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressOutcome {
    /// Operations that behaved as expected.
    pub succeeded: usize,
    /// Operations that errored or returned inconsistent results.
    pub failed: usize,
    /// Wall-clock time of the run, population excluded.
    pub elapsed: Duration,
}

impl StressOutcome {
    fn finish(succeeded: usize, failed: usize, started: Instant) -> Self {
        Self {
            succeeded,
            failed,
            elapsed: started.elapsed(),
        }
    }

    /// Operations per second, or zero for an instantaneous run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.succeeded + self.failed) as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for StressOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ok, {} failed in {:?} ({:.0} ops/s)",
            self.succeeded,
            self.failed,
            self.elapsed,
            self.throughput()
        )
    }
}

/// Shape of a stress run.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations across all threads.
    pub operations: usize,
    /// Worker threads, split between writers and readers.
    pub threads: usize,
    /// Drivers loaded before the run, ids `1..=driver_count`.
    pub driver_count: u64,
    /// Side of the square the drivers are scattered over.
    pub extent: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            threads: 4,
            driver_count: 1_000,
            extent: 100.0,
        }
    }
}

fn populate(registry: &Registry, config: &StressConfig) {
    for record in scattered_drivers(config.driver_count, config.extent) {
        let _ = registry.add(record);
    }
}

fn driver_for(i: usize, config: &StressConfig) -> DriverId {
    DriverId::new(i as u64 % config.driver_count.max(1) + 1)
}

/// Run a sequential relocation stress test.
pub fn stress_sequential_relocations(registry: &Registry, config: &StressConfig) -> StressOutcome {
    populate(registry, config);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let id = driver_for(i, config);
        let location = scattered_location(i as u64 * 31 + 7, config.extent);

        match registry.update(id, DriverUpdate::new().location(location)) {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressOutcome::finish(successful, failed, start)
}

/// Run a spatial query stress test.
pub fn stress_spatial_queries(registry: &Registry, config: &StressConfig) -> StressOutcome {
    populate(registry, config);

    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        let center = scattered_location(i as u64, config.extent);
        let ok = if i % 2 == 0 {
            registry.k_nearest(center, 5).len() == 5.min(registry.count())
        } else {
            registry
                .within_radius(center, config.extent / 20.0)
                .iter()
                .all(|n| n.distance <= config.extent / 20.0)
        };
        if ok {
            successful += 1;
        } else {
            failed += 1;
        }
    }

    StressOutcome::finish(successful, failed, start)
}

/// Run a mixed add/delete/query stress test.
pub fn stress_mixed_operations(registry: &Registry, config: &StressConfig) -> StressOutcome {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    let records = scattered_drivers(config.driver_count, config.extent);
    for i in 0..config.operations {
        let record = &records[i % records.len()];

        let result = match i % 3 {
            // Add or re-add (33%)
            0 => registry.add(record.clone()).or_else(|e| {
                if registry.find(record.id()).is_some() {
                    Ok(())
                } else {
                    Err(e)
                }
            }),
            // Query (33%)
            1 => {
                registry.find_by_prefix("driver 0");
                registry.k_nearest(record.location(), 3);
                Ok(())
            }
            // Delete (33%), missing ids are fine
            _ => match registry.delete(record.id()) {
                Err(e) if !e.is_not_found() => Err(e),
                _ => Ok(()),
            },
        };

        match result {
            Ok(()) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressOutcome::finish(successful, failed, start)
}

/// Run readers and writers concurrently.
///
/// Writers keep moving drivers while readers run k-nearest queries. A
/// read counts as failed if any neighbor's reported distance disagrees
/// with the location it was returned with, or the results are not
/// ordered nearest first.
pub fn stress_concurrent_readers_writers(
    registry: Arc<Registry>,
    config: &StressConfig,
) -> StressOutcome {
    populate(&registry, config);

    let successful = Arc::new(AtomicUsize::new(0));
    let failed = Arc::new(AtomicUsize::new(0));
    let writers = (config.threads / 2).max(1);
    let readers = config.threads.saturating_sub(writers).max(1);
    let ops_per_thread = config.operations / (writers + readers);

    let start = Instant::now();

    let writer_handles: Vec<_> = (0..writers)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let config = config.clone();

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let n = t * ops_per_thread + i;
                    let id = driver_for(n, &config);
                    let location = scattered_location(n as u64 * 13 + 5, config.extent);
                    match registry.update(id, DriverUpdate::new().location(location)) {
                        Ok(()) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => failed.fetch_add(1, Ordering::Relaxed),
                    };
                }
            })
        })
        .collect();

    let reader_handles: Vec<_> = (0..readers)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let successful = Arc::clone(&successful);
            let failed = Arc::clone(&failed);
            let extent = config.extent;

            thread::spawn(move || {
                for i in 0..ops_per_thread {
                    let center = scattered_location((t * ops_per_thread + i) as u64, extent);
                    let nearest = registry.k_nearest(center, 8);
                    if consistent(center, &nearest) {
                        successful.fetch_add(1, Ordering::Relaxed);
                    } else {
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in writer_handles.into_iter().chain(reader_handles) {
        handle.join().expect("Thread panicked");
    }

    StressOutcome::finish(
        successful.load(Ordering::Relaxed),
        failed.load(Ordering::Relaxed),
        start,
    )
}

fn consistent(center: Location, nearest: &[fleetdb_core::Neighbor]) -> bool {
    nearest
        .iter()
        .all(|n| n.distance == center.distance_to(&n.driver.location()))
        && nearest.windows(2).all(|w| w[0].distance <= w[1].distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_reports_throughput() {
        let outcome = StressOutcome {
            succeeded: 90,
            failed: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(outcome.throughput(), 50.0);
        assert_eq!(outcome.to_string(), "90 ok, 10 failed in 2s (50 ops/s)");

        let instant = StressOutcome {
            elapsed: Duration::ZERO,
            ..outcome
        };
        assert_eq!(instant.throughput(), 0.0);
    }

    #[test]
    fn test_sequential_relocations() {
        let registry = Registry::new();
        let config = StressConfig {
            operations: 1_000,
            driver_count: 100,
            ..Default::default()
        };

        let result = stress_sequential_relocations(&registry, &config);
        assert_eq!(result.failed, 0);
        assert_eq!(result.succeeded, 1_000);
        assert!(registry.verify().is_empty());
    }

    #[test]
    fn test_spatial_queries() {
        let registry = Registry::new();
        let config = StressConfig {
            operations: 500,
            driver_count: 200,
            ..Default::default()
        };

        let result = stress_spatial_queries(&registry, &config);
        assert_eq!(result.failed, 0);
    }

    #[test]
    fn test_mixed_operations() {
        let registry = Registry::new();
        let config = StressConfig {
            operations: 1_500,
            driver_count: 100,
            ..Default::default()
        };

        let result = stress_mixed_operations(&registry, &config);
        assert_eq!(result.failed, 0);
        assert!(registry.verify().is_empty());
        registry.compact();
        assert!(registry.verify().is_empty());
    }

    #[test]
    fn test_concurrent_readers_writers() {
        let registry = Arc::new(Registry::new());
        let config = StressConfig {
            operations: 2_000,
            threads: 4,
            driver_count: 150,
            extent: 40.0,
        };

        let result = stress_concurrent_readers_writers(Arc::clone(&registry), &config);
        assert_eq!(result.failed, 0);
        assert!(result.succeeded > 0);
        assert!(registry.verify().is_empty());
    }
}
