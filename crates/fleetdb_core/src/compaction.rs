//! Slot compaction.
//!
//! Deleting a driver only tombstones its slot, so a registry with heavy
//! churn accumulates dead slots. Compaction rebuilds the store with only
//! the active records, in their existing slot order, and rebuilds every
//! index over the new slots.
//!
//! ## Invariants
//!
//! - Compaction **MUST NOT** change the result of any query
//! - Active records keep their relative order, so `all()` is unchanged
//! - Under [`ReaddPolicy::Retire`] the ids of dropped tombstones stay
//!   rejected
//!
//! Compaction only runs when asked for; see [`IndexSet::compact`].
//!
//! [`ReaddPolicy::Retire`]: crate::ReaddPolicy::Retire
//! [`IndexSet::compact`]: crate::IndexSet::compact

use std::fmt;

/// Result of a compaction pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompactionResult {
    /// Number of slots before compaction.
    pub input_slots: usize,
    /// Number of slots after compaction.
    pub output_slots: usize,
    /// Number of tombstoned slots dropped.
    pub tombstones_removed: usize,
}

impl CompactionResult {
    /// Returns true if the pass dropped nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.tombstones_removed == 0
    }
}

impl fmt::Display for CompactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} slots ({} tombstones removed)",
            self.input_slots, self.output_slots, self.tombstones_removed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_summarizes() {
        let result = CompactionResult {
            input_slots: 10,
            output_slots: 7,
            tombstones_removed: 3,
        };
        assert_eq!(result.to_string(), "10 -> 7 slots (3 tombstones removed)");
        assert!(!result.is_noop());
        assert!(CompactionResult::default().is_noop());
    }
}
