//! Name index trait.

use crate::types::DriverId;

/// Normalizes a name or query for case-insensitive matching.
#[must_use]
pub fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

/// Core trait shared by the name indexes.
///
/// Implementations fold names with [`fold_name`] on both insert and
/// search, so callers pass names exactly as stored on the record.
pub trait NameIndex: Send + Sync {
    /// Indexes `name` for `id`.
    fn insert(&mut self, name: &str, id: DriverId);

    /// Removes the entries `insert(name, id)` created.
    ///
    /// Returns false if nothing was indexed under that pair.
    fn remove(&mut self, name: &str, id: DriverId) -> bool;

    /// Returns the ids matching `query`, each once, in breadth-first
    /// discovery order. An empty query matches nothing.
    fn search(&self, query: &str) -> Vec<DriverId>;

    /// Checks that every entry `insert(name, id)` creates is present.
    fn contains(&self, name: &str, id: DriverId) -> bool;

    /// Returns the number of (path, id) entries stored.
    fn entry_count(&self) -> usize;

    /// Returns the number of trie nodes, root excluded.
    fn node_count(&self) -> usize;

    /// Returns true if nothing is indexed.
    fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Drops every entry.
    fn clear(&mut self);
}
