//! Slot store and primary index.

use crate::driver::DriverRecord;
use crate::types::{DriverId, Slot};
use std::collections::HashMap;

/// Append-only record storage with an `id -> slot` primary index.
///
/// Deleting a driver only tombstones its slot; slots are never reused for
/// a different id, so every secondary index can refer to records by slot.
#[derive(Debug, Default)]
pub(crate) struct DriverStore {
    /// Records in insertion order, tombstoned ones included.
    slots: Vec<DriverRecord>,
    /// Primary index. Holds one entry per id, active or tombstoned.
    primary: HashMap<DriverId, Slot>,
    /// Number of non-tombstoned slots.
    active: usize,
}

impl DriverStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Slot mapped to `id`, whether active or tombstoned.
    pub(crate) fn slot_of(&self, id: DriverId) -> Option<Slot> {
        self.primary.get(&id).copied()
    }

    /// Slot of the active record with this id.
    pub(crate) fn active_slot(&self, id: DriverId) -> Option<Slot> {
        self.slot_of(id).filter(|slot| !self.get(*slot).is_tombstoned())
    }

    /// Active record with this id.
    pub(crate) fn find(&self, id: DriverId) -> Option<&DriverRecord> {
        self.active_slot(id).map(|slot| self.get(slot))
    }

    pub(crate) fn get(&self, slot: Slot) -> &DriverRecord {
        &self.slots[slot.index()]
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> &mut DriverRecord {
        &mut self.slots[slot.index()]
    }

    /// Appends an active record and maps its id to the new slot.
    ///
    /// The caller must have checked that the id is unmapped.
    pub(crate) fn push(&mut self, record: DriverRecord) -> Slot {
        debug_assert!(!self.primary.contains_key(&record.id()));
        let slot = Slot(self.slots.len());
        self.primary.insert(record.id(), slot);
        self.slots.push(record);
        self.active += 1;
        slot
    }

    /// Replaces a tombstoned slot with a new active record of the same id.
    pub(crate) fn revive(&mut self, slot: Slot, record: DriverRecord) {
        debug_assert!(self.get(slot).is_tombstoned());
        debug_assert_eq!(self.get(slot).id(), record.id());
        self.slots[slot.index()] = record;
        self.active += 1;
    }

    /// Marks a slot deleted. Returns false if it already was.
    pub(crate) fn tombstone(&mut self, slot: Slot) -> bool {
        let record = &mut self.slots[slot.index()];
        if record.is_tombstoned() {
            return false;
        }
        record.tombstone();
        self.active -= 1;
        true
    }

    /// Iterates active records with their slots, in slot order.
    pub(crate) fn iter_active(&self) -> impl Iterator<Item = (Slot, &DriverRecord)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_tombstoned())
            .map(|(i, r)| (Slot(i), r))
    }

    /// Iterates every slot, tombstoned ones included.
    pub(crate) fn iter_all(&self) -> impl Iterator<Item = (Slot, &DriverRecord)> {
        self.slots.iter().enumerate().map(|(i, r)| (Slot(i), r))
    }

    pub(crate) fn iter_primary(&self) -> impl Iterator<Item = (DriverId, Slot)> + '_ {
        self.primary.iter().map(|(id, slot)| (*id, *slot))
    }

    pub(crate) fn active_count(&self) -> usize {
        self.active
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn tombstoned_count(&self) -> usize {
        self.slots.len() - self.active
    }

    /// Takes every record out, leaving the store empty.
    pub(crate) fn drain(&mut self) -> Vec<DriverRecord> {
        self.primary.clear();
        self.active = 0;
        std::mem::take(&mut self.slots)
    }
}
