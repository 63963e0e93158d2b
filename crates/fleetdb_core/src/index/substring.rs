//! Name substring index.

use crate::index::traits::{fold_name, NameIndex};
use crate::index::trie::Trie;
use crate::types::DriverId;

/// Suffix trie over lowercased names.
///
/// For a name of length L every one of its L suffixes is inserted as a
/// path and the id is attached at the end of each. A substring of the
/// name is a prefix of one of its suffixes, so walking the query path and
/// collecting the subtree yields exactly the names containing the query.
///
/// Cost: O(|query| + subtree) search, but O(L²) insert and remove and
/// O(N·L²) memory. This is only suitable for short strings such as person
/// names; an n-gram inverted index scales better for longer text.
#[derive(Debug, Default)]
pub struct NameSubstringIndex {
    trie: Trie,
}

impl NameSubstringIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

impl NameIndex for NameSubstringIndex {
    fn insert(&mut self, name: &str, id: DriverId) {
        let chars: Vec<char> = fold_name(name).chars().collect();
        for start in 0..chars.len() {
            self.trie.insert(chars[start..].iter().copied(), id);
        }
    }

    fn remove(&mut self, name: &str, id: DriverId) -> bool {
        let chars: Vec<char> = fold_name(name).chars().collect();
        let mut removed = false;
        for start in 0..chars.len() {
            removed |= self.trie.remove(&chars[start..], id);
        }
        removed
    }

    fn search(&self, query: &str) -> Vec<DriverId> {
        if query.is_empty() {
            return Vec::new();
        }
        self.trie.collect_below(fold_name(query).chars())
    }

    fn contains(&self, name: &str, id: DriverId) -> bool {
        let chars: Vec<char> = fold_name(name).chars().collect();
        (0..chars.len()).all(|start| self.trie.contains(chars[start..].iter().copied(), id))
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

    #[test]
    fn finds_inner_substrings() {
        let mut index = NameSubstringIndex::new();
        index.insert("Tran Van Binh", id(7));

        assert_eq!(index.search("van bi"), vec![id(7)]);
        assert_eq!(index.search("Tran"), vec![id(7)]);
        assert_eq!(index.search("h"), vec![id(7)]);
        assert!(index.search("xyz").is_empty());
        assert!(index.search("binh tran").is_empty());
    }

    #[test]
    fn repeated_substring_reports_id_once() {
        let mut index = NameSubstringIndex::new();
        index.insert("Anh An", id(1));
        assert_eq!(index.search("an"), vec![id(1)]);
    }

    #[test]
    fn one_entry_per_suffix() {
        let mut index = NameSubstringIndex::new();
        index.insert("Lam", id(1));
        // "lam", "am", "m"
        assert_eq!(index.entry_count(), 3);
        assert!(index.contains("Lam", id(1)));
    }

    #[test]
    fn remove_clears_every_suffix() {
        let mut index = NameSubstringIndex::new();
        index.insert("Ngo Quoc Khoa", id(1));
        index.insert("Vo Thi Hoa", id(2));

        assert!(index.remove("Ngo Quoc Khoa", id(1)));
        assert!(index.search("quoc").is_empty());
        assert_eq!(index.search("o"), vec![id(2)]);
        assert_eq!(index.entry_count(), "vo thi hoa".chars().count());
        assert!(!index.contains("Ngo Quoc Khoa", id(1)));
    }

    #[test]
    fn remove_unknown_returns_false() {
        let mut index = NameSubstringIndex::new();
        index.insert("Lam", id(1));
        assert!(!index.remove("Lam", id(2)));
        assert!(!index.remove("Linh", id(1)));
        assert_eq!(index.entry_count(), 3);
    }

    #[test]
    fn clear_drops_everything() {
        let mut index = NameSubstringIndex::new();
        index.insert("Pham Hong Nga", id(3));
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.node_count(), 0);
        assert!(index.search("nga").is_empty());
    }
}
