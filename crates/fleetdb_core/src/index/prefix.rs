//! Name prefix index.

use crate::index::traits::{fold_name, NameIndex};
use crate::index::trie::Trie;
use crate::types::DriverId;

/// Trie over full lowercased names.
///
/// Each name is inserted character by character and the id is attached
/// only to the node that ends the full name. A prefix query walks the
/// query path and collects every id in the subtree below it, which is
/// exactly the set of names starting with the query.
///
/// Cost: O(|name|) insert and remove, O(|prefix| + subtree) search.
///
/// # Example
///
/// ```rust
/// use fleetdb_core::index::{NameIndex, NamePrefixIndex};
/// use fleetdb_core::DriverId;
///
/// let mut index = NamePrefixIndex::new();
/// index.insert("Tran Van Binh", DriverId::new(7));
///
/// assert_eq!(index.search("tran"), vec![DriverId::new(7)]);
/// assert!(index.search("binh").is_empty());
/// ```
#[derive(Debug, Default)]
pub struct NamePrefixIndex {
    trie: Trie,
}

impl NamePrefixIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameIndex for NamePrefixIndex {
    fn insert(&mut self, name: &str, id: DriverId) {
        self.trie.insert(fold_name(name).chars(), id);
    }

    fn remove(&mut self, name: &str, id: DriverId) -> bool {
        let path: Vec<char> = fold_name(name).chars().collect();
        self.trie.remove(&path, id)
    }

    fn search(&self, query: &str) -> Vec<DriverId> {
        if query.is_empty() {
            return Vec::new();
        }
        self.trie.collect_below(fold_name(query).chars())
    }

    fn contains(&self, name: &str, id: DriverId) -> bool {
        self.trie.contains(fold_name(name).chars(), id)
    }

    fn entry_count(&self) -> usize {
        self.trie.entry_count()
    }

    fn node_count(&self) -> usize {
        self.trie.node_count()
    }

    fn clear(&mut self) {
        self.trie.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> DriverId {
        DriverId::new(n)
    }

    fn index() -> NamePrefixIndex {
        let mut index = NamePrefixIndex::new();
        index.insert("Tran Van Binh", id(7));
        index.insert("Tran Thi Lan", id(8));
        index.insert("Le Van An", id(9));
        index
    }

    #[test]
    fn prefix_matches_name_starts() {
        let index = index();
        let mut found = index.search("Tran");
        found.sort();
        assert_eq!(found, vec![id(7), id(8)]);

        assert_eq!(index.search("tran v"), vec![id(7)]);
        assert_eq!(index.search("LE"), vec![id(9)]);
    }

    #[test]
    fn inner_words_do_not_match() {
        let index = index();
        assert!(index.search("Van").is_empty());
        assert!(index.search("xyz").is_empty());
    }

    #[test]
    fn full_name_matches_itself() {
        let index = index();
        assert_eq!(index.search("tran van binh"), vec![id(7)]);
        assert!(index.search("tran van binhx").is_empty());
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(index().search("").is_empty());
    }

    #[test]
    fn entries_track_full_names_only() {
        let index = index();
        assert_eq!(index.entry_count(), 3);
        assert!(index.contains("Tran Van Binh", id(7)));
        assert!(!index.contains("Tran", id(7)));
    }

    #[test]
    fn remove_then_search() {
        let mut index = index();
        assert!(index.remove("TRAN VAN BINH", id(7)));
        assert_eq!(index.search("tran"), vec![id(8)]);
        assert!(!index.remove("Tran Van Binh", id(7)));
    }

    #[test]
    fn shared_names_keep_both_ids() {
        let mut index = NamePrefixIndex::new();
        index.insert("Bui Minh Hai", id(1));
        index.insert("Bui Minh Hai", id(2));
        assert_eq!(index.search("bui"), vec![id(1), id(2)]);

        index.remove("Bui Minh Hai", id(1));
        assert_eq!(index.search("bui"), vec![id(2)]);
    }
}
