//! Character trie shared by the name indexes.

use crate::types::DriverId;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

#[derive(Debug, Default)]
struct TrieNode {
    children: BTreeMap<char, TrieNode>,
    ids: BTreeSet<DriverId>,
}

impl TrieNode {
    fn is_empty(&self) -> bool {
        self.children.is_empty() && self.ids.is_empty()
    }
}

/// A trie of `char` paths with driver ids attached to path terminals.
///
/// Children are ordered by character so that traversal order, and with it
/// search result order, is deterministic.
#[derive(Debug, Default)]
pub(crate) struct Trie {
    root: TrieNode,
    /// Nodes below the root.
    nodes: usize,
    /// Sum of id-set sizes over all nodes.
    entries: usize,
}

impl Trie {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Attaches `id` to the node at the end of `path`, creating nodes as
    /// needed. Returns false if the id was already there.
    pub(crate) fn insert<I>(&mut self, path: I, id: DriverId) -> bool
    where
        I: IntoIterator<Item = char>,
    {
        let mut node = &mut self.root;
        for c in path {
            node = node.children.entry(c).or_insert_with(|| {
                self.nodes += 1;
                TrieNode::default()
            });
        }
        let added = node.ids.insert(id);
        if added {
            self.entries += 1;
        }
        added
    }

    /// Detaches `id` from the end of `path` and prunes nodes left with
    /// neither ids nor children.
    pub(crate) fn remove(&mut self, path: &[char], id: DriverId) -> bool {
        let mut pruned = 0;
        let removed = remove_at(&mut self.root, path, id, &mut pruned);
        if removed {
            self.entries -= 1;
        }
        self.nodes -= pruned;
        removed
    }

    /// Returns true if `id` is attached exactly at the end of `path`.
    pub(crate) fn contains<I>(&self, path: I, id: DriverId) -> bool
    where
        I: IntoIterator<Item = char>,
    {
        self.walk(path).is_some_and(|node| node.ids.contains(&id))
    }

    /// Breadth-first collection of every id at or below the end of `path`.
    ///
    /// Each id is reported once, at its shallowest occurrence.
    pub(crate) fn collect_below<I>(&self, path: I) -> Vec<DriverId>
    where
        I: IntoIterator<Item = char>,
    {
        let Some(start) = self.walk(path) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for id in &node.ids {
                if seen.insert(*id) {
                    out.push(*id);
                }
            }
            queue.extend(node.children.values());
        }
        out
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entries
    }

    pub(crate) fn clear(&mut self) {
        self.root = TrieNode::default();
        self.nodes = 0;
        self.entries = 0;
    }

    fn walk<I>(&self, path: I) -> Option<&TrieNode>
    where
        I: IntoIterator<Item = char>,
    {
        let mut node = &self.root;
        for c in path {
            node = node.children.get(&c)?;
        }
        Some(node)
    }
}

fn remove_at(node: &mut TrieNode, path: &[char], id: DriverId, pruned: &mut usize) -> bool {
    let Some((c, rest)) = path.split_first() else {
        return node.ids.remove(&id);
    };
    let Some(child) = node.children.get_mut(c) else {
        return false;
    };
    let removed = remove_at(child, rest, id, pruned);
    if removed && child.is_empty() {
        node.children.remove(c);
        *pruned += 1;
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> DriverId {
        DriverId::new(n)
    }

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn insert_counts_nodes_and_entries() {
        let mut trie = Trie::new();
        assert!(trie.insert("abc".chars(), id(1)));
        assert!(trie.insert("abd".chars(), id(2)));
        assert!(!trie.insert("abc".chars(), id(1)));

        // a, b, c, d
        assert_eq!(trie.node_count(), 4);
        assert_eq!(trie.entry_count(), 2);
    }

    #[test]
    fn collect_is_breadth_first() {
        let mut trie = Trie::new();
        trie.insert("abcd".chars(), id(3));
        trie.insert("ab".chars(), id(1));
        trie.insert("abc".chars(), id(2));

        assert_eq!(trie.collect_below("a".chars()), vec![id(1), id(2), id(3)]);
        assert_eq!(trie.collect_below("abc".chars()), vec![id(2), id(3)]);
        assert!(trie.collect_below("x".chars()).is_empty());
    }

    #[test]
    fn collect_deduplicates() {
        let mut trie = Trie::new();
        trie.insert("aa".chars(), id(1));
        trie.insert("a".chars(), id(1));

        assert_eq!(trie.collect_below("a".chars()), vec![id(1)]);
    }

    #[test]
    fn remove_prunes_empty_branches() {
        let mut trie = Trie::new();
        trie.insert("abc".chars(), id(1));
        trie.insert("ab".chars(), id(2));

        assert!(trie.remove(&chars("abc"), id(1)));
        // "c" is pruned, "b" still holds id 2
        assert_eq!(trie.node_count(), 2);
        assert_eq!(trie.entry_count(), 1);

        assert!(trie.remove(&chars("ab"), id(2)));
        assert_eq!(trie.node_count(), 0);
        assert_eq!(trie.entry_count(), 0);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut trie = Trie::new();
        trie.insert("abc".chars(), id(1));

        assert!(!trie.remove(&chars("abc"), id(2)));
        assert!(!trie.remove(&chars("abz"), id(1)));
        assert!(!trie.remove(&chars("ab"), id(1)));
        assert_eq!(trie.node_count(), 3);
        assert!(trie.contains("abc".chars(), id(1)));
    }

    #[test]
    fn contains_is_exact() {
        let mut trie = Trie::new();
        trie.insert("abc".chars(), id(1));

        assert!(trie.contains("abc".chars(), id(1)));
        assert!(!trie.contains("ab".chars(), id(1)));
    }
}
