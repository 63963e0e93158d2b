//! Registry statistics.
//!
//! Two views are provided:
//!
//! - [`RegistryStats`]: monotonically increasing operation counters,
//!   updated without taking the registry lock
//! - [`RegistrySummary`]: structural sizes of the store and indexes,
//!   computed under the read lock
//!
//! # Usage
//!
//! ```rust
//! use fleetdb_core::{DriverRecord, Location, Registry};
//!
//! let registry = Registry::new();
//! registry.add(DriverRecord::new(1, "Hoang Duc Phong", Location::new(1.0, 1.0)))?;
//! registry.find_by_prefix("hoang");
//!
//! let stats = registry.stats().snapshot();
//! assert_eq!(stats.adds, 1);
//! assert_eq!(stats.name_searches, 1);
//!
//! let summary = registry.summary();
//! assert_eq!(summary.active, 1);
//! # Ok::<(), fleetdb_core::CoreError>(())
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

/// Registry operation counters.
///
/// All counters are atomic and can be read while operations are in
/// progress. Only successful operations are counted, except
/// `validation_failures`.
#[derive(Debug, Default)]
pub struct RegistryStats {
    // Mutations
    /// Drivers added, revivals included.
    adds: AtomicU64,
    /// Successful updates, collaborator mutations included.
    updates: AtomicU64,
    /// Drivers deleted.
    deletes: AtomicU64,

    // Queries
    /// Lookups by id.
    lookups: AtomicU64,
    /// Prefix and substring searches.
    name_searches: AtomicU64,
    /// Radius, k-nearest and best-in-radius queries.
    spatial_queries: AtomicU64,
    /// Top-K by rating queries.
    rating_queries: AtomicU64,

    // Maintenance
    /// Compaction passes.
    compactions: AtomicU64,

    // Errors
    /// Mutations rejected by validation.
    validation_failures: AtomicU64,
}

impl RegistryStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_add(&self) {
        self.adds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_name_search(&self) {
        self.name_searches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spatial_query(&self) {
        self.spatial_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rating_query(&self) {
        self.rating_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_compaction(&self) {
        self.compactions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of drivers added.
    pub fn adds(&self) -> u64 {
        self.adds.load(Ordering::Relaxed)
    }

    /// Returns the number of successful updates.
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Returns the number of drivers deleted.
    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Returns the number of lookups by id.
    pub fn lookups(&self) -> u64 {
        self.lookups.load(Ordering::Relaxed)
    }

    /// Returns the number of name searches.
    pub fn name_searches(&self) -> u64 {
        self.name_searches.load(Ordering::Relaxed)
    }

    /// Returns the number of spatial queries.
    pub fn spatial_queries(&self) -> u64 {
        self.spatial_queries.load(Ordering::Relaxed)
    }

    /// Returns the number of rating queries.
    pub fn rating_queries(&self) -> u64 {
        self.rating_queries.load(Ordering::Relaxed)
    }

    /// Returns the number of compaction passes.
    pub fn compactions(&self) -> u64 {
        self.compactions.load(Ordering::Relaxed)
    }

    /// Returns the number of mutations rejected by validation.
    ///
    /// A steadily rising count usually points at bad input data.
    pub fn validation_failures(&self) -> u64 {
        self.validation_failures.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            adds: self.adds(),
            updates: self.updates(),
            deletes: self.deletes(),
            lookups: self.lookups(),
            name_searches: self.name_searches(),
            spatial_queries: self.spatial_queries(),
            rating_queries: self.rating_queries(),
            compactions: self.compactions(),
            validation_failures: self.validation_failures(),
        }
    }
}

/// A point-in-time copy of [`RegistryStats`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    /// Drivers added.
    pub adds: u64,
    /// Successful updates.
    pub updates: u64,
    /// Drivers deleted.
    pub deletes: u64,
    /// Lookups by id.
    pub lookups: u64,
    /// Name searches.
    pub name_searches: u64,
    /// Spatial queries.
    pub spatial_queries: u64,
    /// Rating queries.
    pub rating_queries: u64,
    /// Compaction passes.
    pub compactions: u64,
    /// Mutations rejected by validation.
    pub validation_failures: u64,
}

/// Structural sizes of a registry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegistrySummary {
    /// Active drivers.
    pub active: usize,
    /// Tombstoned slots awaiting compaction.
    pub tombstoned: usize,
    /// Allocated slots, active and tombstoned.
    pub slots: usize,
    /// Ids remembered as retired by compaction.
    pub retired: usize,
    /// Nodes in the prefix trie.
    pub prefix_nodes: usize,
    /// Nodes in the suffix trie.
    pub substring_nodes: usize,
    /// `(suffix, id)` entries in the suffix trie.
    pub substring_entries: usize,
    /// Non-empty grid cells.
    pub occupied_cells: usize,
    /// Grid cell side length.
    pub cell_size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_are_zero() {
        let stats = RegistryStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn record_operations() {
        let stats = RegistryStats::new();

        stats.record_add();
        stats.record_add();
        stats.record_delete();
        stats.record_name_search();
        stats.record_validation_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.adds, 2);
        assert_eq!(snap.deletes, 1);
        assert_eq!(snap.name_searches, 1);
        assert_eq!(snap.validation_failures, 1);
        assert_eq!(snap.updates, 0);
    }

    #[test]
    fn concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let stats = Arc::new(RegistryStats::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let s = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    s.record_lookup();
                    s.record_spatial_query();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(stats.lookups(), 1000);
        assert_eq!(stats.spatial_queries(), 1000);
    }
}
