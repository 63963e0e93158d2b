//! The store and its indexes, mutated as one unit.

use crate::compaction::CompactionResult;
use crate::config::{ReaddPolicy, RegistryConfig};
use crate::driver::{validate_rating, validate_stars, DriverRecord, DriverStore, DriverUpdate};
use crate::error::{CoreError, CoreResult};
use crate::index::{NameIndex, NamePrefixIndex, NameSubstringIndex, SpatialGrid};
use crate::query::{rating, spatial, Neighbor, RatingOrder, ScoredNeighbor};
use crate::stats::RegistrySummary;
use crate::types::{DriverId, Location, Slot};
use crate::verify::{self, Violation};
use std::collections::HashSet;
use tracing::{debug, info};

/// Driver store plus the prefix, substring and spatial indexes.
///
/// Every write goes through the methods here, which validate first and
/// only then touch the store and indexes, so a rejected mutation leaves
/// everything unchanged. The set has no interior locking; [`Registry`]
/// wraps it in a single `RwLock`.
///
/// [`Registry`]: crate::Registry
#[derive(Debug)]
pub struct IndexSet {
    config: RegistryConfig,
    store: DriverStore,
    prefix: NamePrefixIndex,
    substring: NameSubstringIndex,
    grid: SpatialGrid,
    /// Ids dropped by compaction under [`ReaddPolicy::Retire`].
    retired: HashSet<DriverId>,
}

impl IndexSet {
    /// Creates an empty set after validating `config`.
    pub fn new(config: RegistryConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    pub(crate) fn with_valid_config(config: RegistryConfig) -> Self {
        Self {
            grid: SpatialGrid::new(config.cell_size),
            config,
            store: DriverStore::new(),
            prefix: NamePrefixIndex::new(),
            substring: NameSubstringIndex::new(),
            retired: HashSet::new(),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // === Mutations ===

    /// Adds a driver.
    ///
    /// Fails with [`CoreError::DuplicateId`] if an active driver holds the
    /// id. If a deleted driver held it, the configured [`ReaddPolicy`]
    /// decides between reusing its slot and [`CoreError::IdRetired`].
    pub fn add(&mut self, record: DriverRecord) -> CoreResult<()> {
        record.validate()?;
        let id = record.id();
        if self.retired.contains(&id) {
            return Err(CoreError::IdRetired { id });
        }

        let slot = match self.store.slot_of(id) {
            None => self.store.push(record),
            Some(slot) if !self.store.get(slot).is_tombstoned() => {
                return Err(CoreError::DuplicateId { id });
            }
            Some(slot) => match self.config.readd_policy {
                ReaddPolicy::Revive => {
                    self.store.revive(slot, record);
                    slot
                }
                ReaddPolicy::Retire => return Err(CoreError::IdRetired { id }),
            },
        };
        self.index_slot(slot);
        debug!(driver_id = %id, %slot, "driver added");
        Ok(())
    }

    /// Tombstones a driver and drops it from every secondary index.
    pub fn delete(&mut self, id: DriverId) -> CoreResult<()> {
        let slot = self.active_slot(id)?;
        self.unindex_slot(slot);
        self.store.tombstone(slot);
        debug!(driver_id = %id, %slot, "driver deleted");
        Ok(())
    }

    /// Applies a partial update.
    ///
    /// A rename swaps the name index entries and a move swaps the grid
    /// cell; rating and ride count changes touch no index.
    pub fn update(&mut self, id: DriverId, update: DriverUpdate) -> CoreResult<()> {
        update.validate()?;
        let slot = self.active_slot(id)?;
        let DriverUpdate {
            name,
            location,
            rating,
            total_rides,
        } = update;

        if let Some(name) = name {
            self.rename(slot, name);
        }
        if let Some(location) = location {
            self.relocate(slot, location);
        }
        let record = self.store.get_mut(slot);
        if let Some(rating) = rating {
            record.set_rating(rating);
        }
        if let Some(rides) = total_rides {
            record.set_total_rides(rides);
        }
        debug!(driver_id = %id, "driver updated");
        Ok(())
    }

    /// Counts one completed ride.
    pub fn increment_rides(&mut self, id: DriverId) -> CoreResult<()> {
        let slot = self.active_slot(id)?;
        let record = self.store.get_mut(slot);
        record.record_ride();
        debug!(driver_id = %id, total_rides = record.total_rides(), "ride recorded");
        Ok(())
    }

    /// Records a customer rating of 1 to 5 stars and re-derives the
    /// driver's rating as the mean of all received stars.
    pub fn add_rating(&mut self, id: DriverId, stars: u32) -> CoreResult<()> {
        validate_stars(stars)?;
        let slot = self.active_slot(id)?;
        let record = self.store.get_mut(slot);
        record.record_rating(stars);
        debug!(driver_id = %id, stars, rating = record.rating(), "rating recorded");
        Ok(())
    }

    /// Overrides the rating. The next [`add_rating`] re-derives it from
    /// the accumulated history.
    ///
    /// [`add_rating`]: IndexSet::add_rating
    pub fn set_rating(&mut self, id: DriverId, rating: f64) -> CoreResult<()> {
        validate_rating(rating)?;
        let slot = self.active_slot(id)?;
        self.store.get_mut(slot).set_rating(rating);
        debug!(driver_id = %id, rating, "rating set");
        Ok(())
    }

    /// Rebuilds the store without tombstoned slots and re-indexes every
    /// active driver.
    pub fn compact(&mut self) -> CompactionResult {
        let input_slots = self.store.slot_count();
        let records = self.store.drain();
        self.prefix.clear();
        self.substring.clear();
        self.grid.clear();

        let mut tombstones_removed = 0;
        for record in records {
            if record.is_tombstoned() {
                tombstones_removed += 1;
                if self.config.readd_policy == ReaddPolicy::Retire {
                    self.retired.insert(record.id());
                }
                continue;
            }
            let slot = self.store.push(record);
            self.index_slot(slot);
        }

        let result = CompactionResult {
            input_slots,
            output_slots: self.store.slot_count(),
            tombstones_removed,
        };
        info!(
            input_slots,
            output_slots = result.output_slots,
            tombstones_removed,
            "registry compacted"
        );
        result
    }

    // === Lookups ===

    /// Returns the active driver with this id.
    pub fn find(&self, id: DriverId) -> Option<DriverRecord> {
        self.store.find(id).cloned()
    }

    /// Active drivers whose name starts with `prefix`, case-insensitively.
    pub fn find_by_prefix(&self, prefix: &str) -> Vec<DriverRecord> {
        self.resolve(self.prefix.search(prefix))
    }

    /// Active drivers whose name contains `fragment`, case-insensitively.
    pub fn find_by_substring(&self, fragment: &str) -> Vec<DriverRecord> {
        self.resolve(self.substring.search(fragment))
    }

    /// Active drivers within `radius` of `center`, nearest first, then by
    /// rating descending, then by id.
    pub fn within_radius(&self, center: Location, radius: f64) -> Vec<Neighbor> {
        spatial::within_radius(&self.store, &self.grid, center, radius)
    }

    /// The `k` active drivers nearest to `center`, in the same order as
    /// [`within_radius`](IndexSet::within_radius).
    pub fn k_nearest(&self, center: Location, k: usize) -> Vec<Neighbor> {
        spatial::k_nearest(&self.store, &self.grid, center, k, self.config.max_ring)
    }

    /// Highest-rated driver within `radius` of `center`.
    pub fn top_rated_within_radius(&self, center: Location, radius: f64) -> Option<Neighbor> {
        spatial::top_rated_within_radius(&self.store, &self.grid, center, radius)
    }

    /// Driver within `radius` of `center` with the best balance of
    /// proximity and rating.
    pub fn best_balanced_within_radius(
        &self,
        center: Location,
        radius: f64,
    ) -> Option<ScoredNeighbor> {
        spatial::best_balanced_within_radius(&self.store, &self.grid, center, radius)
    }

    /// The `k` active drivers at the `order` end of the rating scale.
    pub fn top_k_by_rating(&self, k: usize, order: RatingOrder) -> Vec<DriverRecord> {
        rating::top_k(&self.store, k, order)
    }

    /// Iterates active drivers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &DriverRecord> {
        self.store.iter_active().map(|(_, record)| record)
    }

    /// Returns clones of all active drivers in slot order.
    pub fn all(&self) -> Vec<DriverRecord> {
        self.iter().cloned().collect()
    }

    /// Number of active drivers.
    pub fn count(&self) -> usize {
        self.store.active_count()
    }

    /// Returns true if there are no active drivers.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    // === Diagnostics ===

    /// Checks the store against every index. Empty means consistent.
    pub fn verify(&self) -> Vec<Violation> {
        verify::verify(&self.store, &self.prefix, &self.substring, &self.grid)
    }

    /// Structural sizes of the store and indexes.
    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            active: self.store.active_count(),
            tombstoned: self.store.tombstoned_count(),
            slots: self.store.slot_count(),
            retired: self.retired.len(),
            prefix_nodes: self.prefix.node_count(),
            substring_nodes: self.substring.node_count(),
            substring_entries: self.substring.entry_count(),
            occupied_cells: self.grid.occupied_cells(),
            cell_size: self.grid.cell_size(),
        }
    }

    // === Internals ===

    fn active_slot(&self, id: DriverId) -> CoreResult<Slot> {
        self.store
            .active_slot(id)
            .ok_or_else(|| CoreError::not_found(id))
    }

    fn resolve(&self, ids: Vec<DriverId>) -> Vec<DriverRecord> {
        ids.into_iter()
            .filter_map(|id| self.store.find(id).cloned())
            .collect()
    }

    fn index_slot(&mut self, slot: Slot) {
        let record = self.store.get(slot);
        self.prefix.insert(record.name(), record.id());
        self.substring.insert(record.name(), record.id());
        self.grid.insert(slot, record.location());
    }

    fn unindex_slot(&mut self, slot: Slot) {
        let record = self.store.get(slot);
        self.prefix.remove(record.name(), record.id());
        self.substring.remove(record.name(), record.id());
        self.grid.remove(slot, record.location());
    }

    fn rename(&mut self, slot: Slot, name: String) {
        let record = self.store.get(slot);
        if record.name() == name {
            return;
        }
        let id = record.id();
        self.prefix.remove(record.name(), id);
        self.substring.remove(record.name(), id);
        self.prefix.insert(&name, id);
        self.substring.insert(&name, id);
        self.store.get_mut(slot).set_name(name);
    }

    fn relocate(&mut self, slot: Slot, location: Location) {
        let old = self.store.get(slot).location();
        if self.grid.cell_key(old) != self.grid.cell_key(location) {
            self.grid.remove(slot, old);
            self.grid.insert(slot, location);
        }
        self.store.get_mut(slot).set_location(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: u64, name: &str, x: f64, y: f64) -> DriverRecord {
        DriverRecord::new(id, name, Location::new(x, y))
    }

    fn set() -> IndexSet {
        let mut set = IndexSet::new(RegistryConfig::default()).unwrap();
        set.add(driver(7, "Tran Van Binh", 1.0, 1.0)).unwrap();
        set.add(driver(8, "Le Thi Lan", 4.0, 4.0)).unwrap();
        set
    }

    fn ids(records: &[DriverRecord]) -> Vec<u64> {
        records.iter().map(|r| r.id().as_u64()).collect()
    }

    #[test]
    fn add_indexes_every_path() {
        let set = set();
        assert_eq!(set.count(), 2);
        assert_eq!(set.find(DriverId::new(7)).unwrap().name(), "Tran Van Binh");
        assert_eq!(ids(&set.find_by_prefix("tran")), vec![7]);
        assert_eq!(ids(&set.find_by_substring("thi")), vec![8]);
        assert_eq!(set.within_radius(Location::new(1.0, 1.0), 0.5).len(), 1);
        assert!(set.verify().is_empty());
    }

    #[test]
    fn rejected_add_changes_nothing() {
        let mut set = set();
        let err = set.add(driver(7, "Other", 0.0, 0.0)).unwrap_err();
        assert_eq!(err, CoreError::DuplicateId { id: DriverId::new(7) });

        let err = set.add(driver(9, "  ", 0.0, 0.0)).unwrap_err();
        assert!(err.is_validation());

        let err = set
            .add(driver(9, "Pham Quoc Hai", 0.0, 0.0).with_rating(6.0))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidField { field: "rating", .. }));

        assert_eq!(set.count(), 2);
        assert!(set.find_by_prefix("other").is_empty());
        assert!(set.find(DriverId::new(9)).is_none());
        assert!(set.verify().is_empty());
    }

    #[test]
    fn delete_removes_from_secondary_indexes() {
        let mut set = set();
        set.delete(DriverId::new(7)).unwrap();

        assert!(set.find(DriverId::new(7)).is_none());
        assert!(set.find_by_prefix("tran").is_empty());
        assert!(set.find_by_substring("binh").is_empty());
        assert!(set.within_radius(Location::new(1.0, 1.0), 0.5).is_empty());
        assert_eq!(set.count(), 1);
        assert_eq!(set.summary().tombstoned, 1);
        assert!(set.verify().is_empty());

        assert!(set.delete(DriverId::new(7)).unwrap_err().is_not_found());
    }

    #[test]
    fn readd_revives_slot_by_default() {
        let mut set = set();
        set.delete(DriverId::new(7)).unwrap();
        set.add(driver(7, "Tran Van Binh", 9.0, 9.0)).unwrap();

        assert_eq!(set.summary().slots, 2);
        assert_eq!(ids(&set.find_by_prefix("tran")), vec![7]);
        assert_eq!(
            set.find(DriverId::new(7)).unwrap().location(),
            Location::new(9.0, 9.0)
        );
        assert!(set.verify().is_empty());
    }

    #[test]
    fn readd_rejected_under_retire() {
        let config = RegistryConfig::new().readd_policy(ReaddPolicy::Retire);
        let mut set = IndexSet::new(config).unwrap();
        set.add(driver(7, "Tran Van Binh", 1.0, 1.0)).unwrap();
        set.delete(DriverId::new(7)).unwrap();

        let err = set.add(driver(7, "Tran Van Binh", 1.0, 1.0)).unwrap_err();
        assert_eq!(err, CoreError::IdRetired { id: DriverId::new(7) });

        // Still rejected once compaction has dropped the slot.
        set.compact();
        let err = set.add(driver(7, "Tran Van Binh", 1.0, 1.0)).unwrap_err();
        assert_eq!(err, CoreError::IdRetired { id: DriverId::new(7) });
        assert_eq!(set.summary().retired, 1);
    }

    #[test]
    fn rename_swaps_name_entries() {
        let mut set = set();
        set.update(DriverId::new(7), DriverUpdate::new().name("Ngo Minh Khoa"))
            .unwrap();

        assert!(set.find_by_prefix("tran").is_empty());
        assert!(set.find_by_substring("binh").is_empty());
        assert_eq!(ids(&set.find_by_prefix("ngo")), vec![7]);
        assert_eq!(ids(&set.find_by_substring("khoa")), vec![7]);
        assert!(set.verify().is_empty());
    }

    #[test]
    fn relocate_swaps_grid_cell() {
        let mut set = set();
        set.update(
            DriverId::new(7),
            DriverUpdate::new().location(Location::new(20.5, -3.5)),
        )
        .unwrap();

        assert!(set.within_radius(Location::new(1.0, 1.0), 0.5).is_empty());
        let near = set.within_radius(Location::new(20.0, -3.0), 1.0);
        assert_eq!(near[0].driver.id(), DriverId::new(7));
        assert!(set.verify().is_empty());

        // Move within the same cell.
        set.update(
            DriverId::new(7),
            DriverUpdate::new().location(Location::new(20.6, -3.6)),
        )
        .unwrap();
        assert!(set.verify().is_empty());
    }

    #[test]
    fn invalid_update_is_not_partially_applied() {
        let mut set = set();
        let update = DriverUpdate::new().name("Bui Hong Nga").rating(-1.0);
        assert!(set.update(DriverId::new(7), update).is_err());

        assert_eq!(set.find(DriverId::new(7)).unwrap().name(), "Tran Van Binh");
        assert!(set.find_by_prefix("bui").is_empty());

        let err = set
            .update(DriverId::new(99), DriverUpdate::new().total_rides(3))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn collaborator_mutations() {
        let mut set = set();
        let id = DriverId::new(8);

        set.increment_rides(id).unwrap();
        set.increment_rides(id).unwrap();
        set.add_rating(id, 4).unwrap();
        set.add_rating(id, 3).unwrap();

        let d = set.find(id).unwrap();
        assert_eq!(d.total_rides(), 2);
        assert_eq!(d.rating_count(), 2);
        assert_eq!(d.rating(), 3.5);

        set.set_rating(id, 4.9).unwrap();
        assert_eq!(set.find(id).unwrap().rating(), 4.9);

        assert!(set.add_rating(id, 0).unwrap_err().is_validation());
        assert!(set.set_rating(id, 5.1).unwrap_err().is_validation());
        assert!(set.increment_rides(DriverId::new(1)).unwrap_err().is_not_found());
    }

    #[test]
    fn compact_drops_tombstones_and_keeps_queries() {
        let mut set = set();
        set.add(driver(9, "Dang Thanh Tam", 1.5, 1.0)).unwrap();
        set.delete(DriverId::new(8)).unwrap();
        let before = set.all();

        let result = set.compact();
        assert_eq!(result.input_slots, 3);
        assert_eq!(result.output_slots, 2);
        assert_eq!(result.tombstones_removed, 1);

        assert_eq!(set.all(), before);
        assert_eq!(set.summary().tombstoned, 0);
        assert_eq!(ids(&set.find_by_prefix("dang")), vec![9]);
        assert_eq!(set.k_nearest(Location::new(1.0, 1.0), 1)[0].driver.id(), DriverId::new(7));
        assert!(set.verify().is_empty());

        // Revive still works for compacted ids under the default policy.
        set.add(driver(8, "Le Thi Lan", 4.0, 4.0)).unwrap();
        assert_eq!(set.count(), 3);
    }

    #[test]
    fn rejects_bad_config() {
        let err = IndexSet::new(RegistryConfig::new().cell_size(0.0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig { .. }));
    }
}
