//! Cross-index consistency checks.
//!
//! A healthy registry satisfies, for every slot:
//!
//! - the primary index maps the record's id back to that slot
//! - an active record is valid and appears in both name indexes under its
//!   current name and in the grid cell for its current location
//! - a tombstoned record appears in none of the secondary indexes
//!
//! plus entry counts that rule out stale entries for ids no longer
//! present. [`verify`] reports every broken rule rather than stopping at
//! the first.

use crate::driver::DriverStore;
use crate::index::{fold_name, NameIndex, NamePrefixIndex, NameSubstringIndex, SpatialGrid};
use crate::types::{DriverId, Slot};
use std::fmt;

/// What kind of rule a [`Violation`] broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// The primary index has no entry for the record's id, or points at
    /// another slot.
    PrimaryMismatch,
    /// A primary entry points at a missing slot or a record with another id.
    DanglingPrimary,
    /// An active record failed field validation.
    InvalidRecord(String),
    /// An active record is missing from the named index.
    MissingEntry(&'static str),
    /// A tombstoned record is still present in the named index.
    StaleEntry(&'static str),
    /// An index holds a different number of entries than the store implies.
    CountMismatch {
        /// Structure whose count is off.
        index: &'static str,
        /// Count implied by the store.
        expected: usize,
        /// Count actually held.
        actual: usize,
    },
}

/// A single broken consistency rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Driver the rule was checked for, when it concerns one driver.
    pub id: Option<DriverId>,
    /// Slot the rule was checked for, when it concerns one slot.
    pub slot: Option<Slot>,
    /// The broken rule.
    pub kind: ViolationKind,
}

impl Violation {
    fn at(id: DriverId, slot: Slot, kind: ViolationKind) -> Self {
        Self {
            id: Some(id),
            slot: Some(slot),
            kind,
        }
    }

    fn global(kind: ViolationKind) -> Self {
        Self {
            id: None,
            slot: None,
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = self.id {
            write!(f, "driver {id}")?;
            if let Some(slot) = self.slot {
                write!(f, " ({slot})")?;
            }
            write!(f, ": ")?;
        }
        match &self.kind {
            ViolationKind::PrimaryMismatch => write!(f, "primary index does not map id to slot"),
            ViolationKind::DanglingPrimary => write!(f, "primary entry points at wrong record"),
            ViolationKind::InvalidRecord(reason) => write!(f, "invalid record: {reason}"),
            ViolationKind::MissingEntry(index) => write!(f, "missing from {index} index"),
            ViolationKind::StaleEntry(index) => write!(f, "tombstoned but still in {index} index"),
            ViolationKind::CountMismatch {
                index,
                expected,
                actual,
            } => write!(f, "{index} holds {actual} entries, expected {expected}"),
        }
    }
}

/// Checks the store against every index.
pub(crate) fn verify(
    store: &DriverStore,
    prefix: &NamePrefixIndex,
    substring: &NameSubstringIndex,
    grid: &SpatialGrid,
) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut active = 0usize;
    let mut suffixes = 0usize;

    for (slot, record) in store.iter_all() {
        let id = record.id();
        if store.slot_of(id) != Some(slot) {
            out.push(Violation::at(id, slot, ViolationKind::PrimaryMismatch));
        }

        let name = record.name();
        let presence = [
            (prefix.contains(name, id), "prefix"),
            (substring.contains(name, id), "substring"),
            (grid.contains(slot, record.location()), "grid"),
        ];

        if record.is_tombstoned() {
            for (present, index) in presence {
                if present {
                    out.push(Violation::at(id, slot, ViolationKind::StaleEntry(index)));
                }
            }
            continue;
        }

        active += 1;
        suffixes += fold_name(name).chars().count();
        if let Err(e) = record.validate() {
            out.push(Violation::at(id, slot, ViolationKind::InvalidRecord(e.to_string())));
        }
        for (present, index) in presence {
            if !present {
                out.push(Violation::at(id, slot, ViolationKind::MissingEntry(index)));
            }
        }
    }

    for (id, slot) in store.iter_primary() {
        let points_home = slot.index() < store.slot_count() && store.get(slot).id() == id;
        if !points_home {
            out.push(Violation::at(id, slot, ViolationKind::DanglingPrimary));
        }
    }

    let counts = [
        ("active counter", active, store.active_count()),
        ("prefix", active, prefix.entry_count()),
        ("substring", suffixes, substring.entry_count()),
        ("grid", active, grid.entry_count()),
    ];
    for (index, expected, actual) in counts {
        if expected != actual {
            out.push(Violation::global(ViolationKind::CountMismatch {
                index,
                expected,
                actual,
            }));
        }
    }

    out
}
