//! Thread-safe registry handle.

use crate::compaction::CompactionResult;
use crate::config::RegistryConfig;
use crate::driver::{DriverRecord, DriverUpdate};
use crate::error::CoreResult;
use crate::index_set::IndexSet;
use crate::query::{Neighbor, RatingOrder, ScoredNeighbor};
use crate::stats::{RegistryStats, RegistrySummary};
use crate::types::{DriverId, Location};
use crate::verify::Violation;
use parking_lot::RwLock;

/// The driver registry.
///
/// Wraps an [`IndexSet`] in a single `RwLock`: every mutation holds the
/// write guard for its whole duration, every query holds the read guard.
/// There are no per-index locks, so readers never observe one index
/// updated and another not.
///
/// # Example
///
/// ```rust
/// use fleetdb_core::{DriverRecord, Location, Registry};
///
/// let registry = Registry::new();
/// registry.add(DriverRecord::new(1, "Nguyen Van An", Location::new(0.0, 0.0)).with_rating(4.8))?;
/// registry.add(DriverRecord::new(2, "Tran Thi Lan", Location::new(3.0, 4.0)).with_rating(4.9))?;
///
/// let nearest = registry.k_nearest(Location::new(1.0, 1.0), 1);
/// assert_eq!(nearest[0].driver.name(), "Nguyen Van An");
///
/// let best = registry.top_k_by_rating(1, true);
/// assert_eq!(best[0].name(), "Tran Thi Lan");
/// # Ok::<(), fleetdb_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct Registry {
    inner: RwLock<IndexSet>,
    stats: RegistryStats,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::from_index_set(IndexSet::with_valid_config(RegistryConfig::default()))
    }

    /// Creates an empty registry after validating `config`.
    pub fn with_config(config: RegistryConfig) -> CoreResult<Self> {
        Ok(Self::from_index_set(IndexSet::new(config)?))
    }

    fn from_index_set(set: IndexSet) -> Self {
        Self {
            inner: RwLock::new(set),
            stats: RegistryStats::new(),
        }
    }

    /// Returns a copy of the configuration.
    pub fn config(&self) -> RegistryConfig {
        self.inner.read().config().clone()
    }

    /// Returns the operation counters.
    pub fn stats(&self) -> &RegistryStats {
        &self.stats
    }

    /// Runs `f` under the read lock.
    ///
    /// Use this to run several queries against one consistent state.
    pub fn read<R>(&self, f: impl FnOnce(&IndexSet) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` under the write lock.
    ///
    /// Operations performed here are not counted in [`stats`](Registry::stats).
    pub fn write<R>(&self, f: impl FnOnce(&mut IndexSet) -> R) -> R {
        f(&mut self.inner.write())
    }

    fn track<T>(&self, result: CoreResult<T>, on_success: fn(&RegistryStats)) -> CoreResult<T> {
        match &result {
            Ok(_) => on_success(&self.stats),
            Err(e) if e.is_validation() => self.stats.record_validation_failure(),
            Err(_) => {}
        }
        result
    }

    // === Mutations ===

    /// Adds a driver. See [`IndexSet::add`].
    pub fn add(&self, record: DriverRecord) -> CoreResult<()> {
        let result = self.inner.write().add(record);
        self.track(result, RegistryStats::record_add)
    }

    /// Deletes a driver. See [`IndexSet::delete`].
    pub fn delete(&self, id: DriverId) -> CoreResult<()> {
        let result = self.inner.write().delete(id);
        self.track(result, RegistryStats::record_delete)
    }

    /// Applies a partial update. See [`IndexSet::update`].
    pub fn update(&self, id: DriverId, update: DriverUpdate) -> CoreResult<()> {
        let result = self.inner.write().update(id, update);
        self.track(result, RegistryStats::record_update)
    }

    /// Counts one completed ride.
    pub fn increment_rides(&self, id: DriverId) -> CoreResult<()> {
        let result = self.inner.write().increment_rides(id);
        self.track(result, RegistryStats::record_update)
    }

    /// Records a 1 to 5 star customer rating.
    pub fn add_rating(&self, id: DriverId, stars: u32) -> CoreResult<()> {
        let result = self.inner.write().add_rating(id, stars);
        self.track(result, RegistryStats::record_update)
    }

    /// Overrides a driver's rating.
    pub fn set_rating(&self, id: DriverId, rating: f64) -> CoreResult<()> {
        let result = self.inner.write().set_rating(id, rating);
        self.track(result, RegistryStats::record_update)
    }

    /// Drops tombstoned slots and rebuilds every index.
    pub fn compact(&self) -> CompactionResult {
        let result = self.inner.write().compact();
        self.stats.record_compaction();
        result
    }

    // === Queries ===

    /// Returns the active driver with this id.
    pub fn find(&self, id: DriverId) -> Option<DriverRecord> {
        self.stats.record_lookup();
        self.inner.read().find(id)
    }

    /// Active drivers whose name starts with `prefix`.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<DriverRecord> {
        self.stats.record_name_search();
        self.inner.read().find_by_prefix(prefix)
    }

    /// Active drivers whose name contains `fragment`.
    pub fn find_by_substring(&self, fragment: &str) -> Vec<DriverRecord> {
        self.stats.record_name_search();
        self.inner.read().find_by_substring(fragment)
    }

    /// Active drivers within `radius` of `center`, nearest first.
    pub fn within_radius(&self, center: Location, radius: f64) -> Vec<Neighbor> {
        self.stats.record_spatial_query();
        self.inner.read().within_radius(center, radius)
    }

    /// The `k` active drivers nearest to `center`.
    pub fn k_nearest(&self, center: Location, k: usize) -> Vec<Neighbor> {
        self.stats.record_spatial_query();
        self.inner.read().k_nearest(center, k)
    }

    /// Highest-rated driver within `radius` of `center`.
    pub fn top_rated_within_radius(&self, center: Location, radius: f64) -> Option<Neighbor> {
        self.stats.record_spatial_query();
        self.inner.read().top_rated_within_radius(center, radius)
    }

    /// Best proximity/rating balance within `radius` of `center`.
    pub fn best_balanced_within_radius(
        &self,
        center: Location,
        radius: f64,
    ) -> Option<ScoredNeighbor> {
        self.stats.record_spatial_query();
        self.inner.read().best_balanced_within_radius(center, radius)
    }

    /// The `k` highest rated drivers, or the `k` lowest when `highest` is
    /// false.
    pub fn top_k_by_rating(&self, k: usize, highest: bool) -> Vec<DriverRecord> {
        self.stats.record_rating_query();
        self.inner
            .read()
            .top_k_by_rating(k, RatingOrder::from_highest(highest))
    }

    /// All active drivers in slot order.
    pub fn all(&self) -> Vec<DriverRecord> {
        self.inner.read().all()
    }

    /// Number of active drivers.
    pub fn count(&self) -> usize {
        self.inner.read().count()
    }

    /// Checks every index against the store.
    pub fn verify(&self) -> Vec<Violation> {
        self.inner.read().verify()
    }

    /// Structural sizes of the store and indexes.
    pub fn summary(&self) -> RegistrySummary {
        self.inner.read().summary()
    }
}
